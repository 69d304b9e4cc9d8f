use tokio::sync::watch;

use crate::types::SessionSnapshot;

/// A presentation layer for a session
///
/// Implementations draw whatever they like from each snapshot. Any number
/// of views can watch the same session.
pub trait SessionView: Send {
    fn render(&mut self, snapshot: &SessionSnapshot);
}

/// Feed every published snapshot to `view` until the controller stops.
///
/// Intermediate snapshots may be skipped when the view falls behind; the
/// latest one is always rendered.
pub async fn drive_view<V: SessionView + ?Sized>(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    view: &mut V,
) {
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        view.render(&snapshot);
        
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}
