pub mod interactive_session;
pub mod report_renderer;
