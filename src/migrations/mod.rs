//! Schema migration helpers.
//!
//! Only what upgrading legacy `index_together` declarations needs: the
//! converter, the operations it emits, a project state to apply them to and
//! a recorder that makes re-running an applied migration a no-op.

mod error;
mod index_together;
mod operations;
mod plan;
mod recorder;
mod state;

pub use error::MigrationError;
pub use index_together::{IndexTogether, convert_index_together, index_name};
pub use operations::{Index, Operation};
pub use plan::{MigrationPlan, StateFile};
pub use recorder::{Migration, MigrationRecorder};
pub use state::{ModelState, ProjectState};
