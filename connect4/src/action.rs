#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Action {
    DropPiece(u64),
}

impl Action {
    /// The column of the drop, from 1 to 7.
    pub fn column(&self) -> usize {
        let Action::DropPiece(column) = self;
        *column as usize
    }
}
