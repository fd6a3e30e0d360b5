//! Shared traits implemented by the revenue recognition entities.

use uuid::Uuid;

/// Exposes a stable identifier for entities owned by a tenant.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Associates an entity with the tenant that owns it.
pub trait TenantScoped {
    fn tenant_id(&self) -> Uuid;
}

/// Converts an entity into a short label for logs and reports.
pub trait Displayable {
    fn display_label(&self) -> String;
}
