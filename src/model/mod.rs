//! Domain entities and their create/update commands.

pub mod hub;
pub mod route;
pub mod shipment;
pub mod user;

pub use hub::{Hub, HubStatus, HubUpdate, NewHub};
pub use route::{NewRoute, Route, RouteStatus, RouteUpdate};
pub use shipment::{
    Dimensions, Event, EventStatus, NewEvent, NewShipment, ServiceType, Shipment, ShipmentUpdate,
};
pub use user::{LoginCredentials, NewUser, Role, User, UserStatus, UserUpdate};
