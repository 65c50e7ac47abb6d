use crate::services::page::PageHandle;
use crate::services::panel::PanelSession;

pub struct AppState {
    pub panel: PanelSession,
    pub page: PageHandle,
}
