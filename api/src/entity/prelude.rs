pub use super::activity::Entity as Activity;
pub use super::collection::Entity as Collection;
pub use super::item::Entity as Item;
pub use super::item_external::Entity as ItemExternal;
