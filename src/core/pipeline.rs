pub use crate::app::pipelines::menu_pipeline::MenuPipeline;
