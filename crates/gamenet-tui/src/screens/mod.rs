//! Screen implementations. Each screen is a top-level Component.

pub mod clients;
pub mod dashboard;
pub mod vhd;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new()),
        ),
        (ScreenId::Clients, Box::new(clients::ClientsScreen::new())),
        (ScreenId::Vhd, Box::new(vhd::VhdScreen::new())),
    ]
}
