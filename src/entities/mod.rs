pub mod auto_history;

pub use auto_history::Entity as AutoHistory;
