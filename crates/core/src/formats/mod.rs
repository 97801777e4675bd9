//! Built-in format handlers.

pub mod delimited;
pub mod html;
pub mod jira;
pub mod json;
pub mod latex;
pub mod rst;
pub mod sql;
pub mod xlsx;
pub mod yaml;

use crate::registry::FormatHandler;

/// Built-in handlers in detection priority order: structured formats first
pub(crate) fn builtin_handlers() -> Vec<FormatHandler> {
    vec![
        json::handler(),
        xlsx::handler(),
        xlsx::xls_handler(),
        yaml::handler(),
        delimited::csv_handler(),
        delimited::tsv_handler(),
        xlsx::ods_handler(),
        html::handler(),
        jira::handler(),
        latex::handler(),
        rst::handler(),
        sql::handler(),
    ]
}
