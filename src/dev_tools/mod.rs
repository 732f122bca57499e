pub mod report_generator;
