pub mod bulk_dispatcher;
