use serde::{Deserialize, Serialize};

use crate::board::BoardId;

/// Fixed key of the single selection pointer record.
pub const POINTER_KEY: u64 = 1;

/// The single persisted record identifying which board is active. Created
/// during first-run initialization and never absent afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPointer {
    pub id: u64,
    #[serde(rename = "selectedBoardId")]
    pub selected_board_id: BoardId,
}

impl SelectionPointer {
    pub fn new(selected_board_id: BoardId) -> Self {
        Self {
            id: POINTER_KEY,
            selected_board_id,
        }
    }
}

/// Derived (never persisted) navigation entry: one per board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "boardName")]
    pub board_name: String,
    pub uid: BoardId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_uses_fixed_key() {
        let pointer = SelectionPointer::new(7);
        assert_eq!(pointer.id, POINTER_KEY);

        let value = serde_json::to_value(pointer).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["selectedBoardId"], 7);
    }
}
