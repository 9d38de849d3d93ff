use cli_common::DbError;

use crate::consts::EXPECT_SHALLOWER_CONDITION;

/// Bounds how deeply conditions may nest so hostile input can't blow the
/// stack of the recursive descent.
pub struct RecursionGuard {
    remaining: usize,
}

impl RecursionGuard {
    pub fn new(max_depth: usize) -> Self {
        RecursionGuard {
            remaining: max_depth,
        }
    }

    pub fn dec(&mut self, position: usize) -> Result<(), DbError> {
        if self.remaining == 0 {
            return Err(DbError::grammar(EXPECT_SHALLOWER_CONDITION, position));
        }

        self.remaining -= 1;

        Ok(())
    }

    pub fn inc(&mut self) {
        self.remaining += 1;
    }
}
