pub mod classify;
pub mod editor;
pub mod filter;
pub mod gantt;
pub mod group;
pub mod item_ops;
pub mod kanban;
pub mod orchestrator;
pub mod table;
