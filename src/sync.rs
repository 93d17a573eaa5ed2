//! Mirrors board changes into a [`TaskStore`].

use crate::board::{BoardState, Change};
use crate::model::TaskId;
use crate::store::{self, TaskStore};

/// Write `change` through to `store`. A created task is re-keyed on the
/// board to the id the store generated.
pub fn push_change(
    store: &mut impl TaskStore,
    state: &mut BoardState,
    change: Change,
) -> store::Result<()> {
    match change {
        Change::Created(task) => {
            let record = store.create_task(task.to_fields())?;
            let stored = record
                .get("id")
                .and_then(|v| v.as_str())
                .map(TaskId::new)
                .unwrap_or_else(|| task.id.clone());
            state.rekey(&task.id, stored);
        }
        Change::Updated { id, fields } => {
            store.update_task(&id, fields)?;
        }
        Change::Deleted(id) => store.delete_task(&id)?,
    }
    Ok(())
}
