use std::fmt::Display;

/// Emits one event per applied status transition
#[derive(Debug, Clone, Copy)]
pub struct AuditLog {
    enabled: bool,
}

impl AuditLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn transition(&self, entity: &str, id: i64, from: impl Display, to: impl Display, actor: i64) {
        if self.enabled {
            tracing::info!(target: "audit", entity, id, %from, %to, actor, "status transition");
        } else {
            tracing::debug!(entity, id, %from, %to, actor, "status transition");
        }
    }
}
