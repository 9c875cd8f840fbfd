pub mod draft_json_parser;
pub mod lrc_parser;
