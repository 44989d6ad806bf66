use taskboard_domain::{Board, BoardId, CatalogEntry};
use tokio::sync::watch;

/// The three state channels UI collaborators observe. Each holds the latest
/// value and replays it to new subscribers (`tokio::sync::watch`), so a
/// late-mounting view sees current state immediately.
pub struct StateChannels {
    selected_board_id: watch::Sender<Option<BoardId>>,
    catalog: watch::Sender<Vec<CatalogEntry>>,
    selected_board: watch::Sender<Option<Board>>,
}

impl StateChannels {
    pub(crate) fn new() -> Self {
        Self {
            selected_board_id: watch::Sender::new(None),
            catalog: watch::Sender::new(Vec::new()),
            selected_board: watch::Sender::new(None),
        }
    }

    pub fn subscribe_selected_board_id(&self) -> watch::Receiver<Option<BoardId>> {
        self.selected_board_id.subscribe()
    }

    pub fn subscribe_catalog(&self) -> watch::Receiver<Vec<CatalogEntry>> {
        self.catalog.subscribe()
    }

    pub fn subscribe_selected_board(&self) -> watch::Receiver<Option<Board>> {
        self.selected_board.subscribe()
    }

    pub fn current_selected_board_id(&self) -> Option<BoardId> {
        *self.selected_board_id.borrow()
    }

    pub fn current_catalog(&self) -> Vec<CatalogEntry> {
        self.catalog.borrow().clone()
    }

    pub fn current_selected_board(&self) -> Option<Board> {
        self.selected_board.borrow().clone()
    }

    pub(crate) fn publish_selected_board_id(&self, id: Option<BoardId>) {
        self.selected_board_id.send_replace(id);
    }

    pub(crate) fn publish_catalog(&self, catalog: Vec<CatalogEntry>) {
        self.catalog.send_replace(catalog);
    }

    pub(crate) fn publish_selected_board(&self, board: Option<Board>) {
        self.selected_board.send_replace(board);
    }
}
