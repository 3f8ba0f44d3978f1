use crate::schema::QualifiedTableName;

/// Progress reported by the generator. The core never prints; a sink decides
/// how (and whether) to present these.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    TableStarted {
        table: QualifiedTableName,
    },
    TableSucceeded {
        table: QualifiedTableName,
        file_name: String,
    },
    TableFailed {
        table: QualifiedTableName,
        reason: String,
    },
    ForeignKeyAutoIncluded {
        from: QualifiedTableName,
        to: QualifiedTableName,
    },
    ForeignKeyTargetMissing {
        table: QualifiedTableName,
        referenced: QualifiedTableName,
        column: String,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: GenerationEvent);
}

/// Renders events as log records.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: GenerationEvent) {
        match event {
            GenerationEvent::TableStarted { table } => {
                tracing::debug!("Processing {table}");
            }
            GenerationEvent::TableSucceeded { table, file_name } => {
                tracing::info!("Generated {file_name} for {table}");
            }
            GenerationEvent::TableFailed { table, reason } => {
                tracing::warn!("Skipping {table}: {reason}");
            }
            GenerationEvent::ForeignKeyAutoIncluded { from, to } => {
                tracing::info!("Including {to} (referenced by {from})");
            }
            GenerationEvent::ForeignKeyTargetMissing {
                table,
                referenced,
                column,
            } => {
                tracing::warn!(
                    "{table}.{column} references {referenced}, which is not being generated; \
                     the relationship is omitted. Add '{referenced}' to --tables or pass --auto-include."
                );
            }
        }
    }
}
