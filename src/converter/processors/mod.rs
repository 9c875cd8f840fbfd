pub mod formatting_analyzer;
