//! Display labels for registry records.
//!
//! Pure formatting over already-loaded records. Callers resolve ancestry and
//! referenced records first (see `AreaService::ancestry_chain`).

use crate::model::area::Area;
use crate::model::contact::Contact;
use crate::model::facility::Facility;
use crate::model::role::Role;

/// `"{name} ({type})"` for a root, `"{name} ({type} in {parent} in ...)"`
/// otherwise.
///
/// `ancestors` is root-first, as returned by the ancestry walk; the label
/// lists them nearest-first using bare names.
pub fn area_label(area: &Area, ancestors: &[Area]) -> String {
    if ancestors.is_empty() {
        return format!("{} ({})", area.name, area.area_type);
    }
    let path = ancestors
        .iter()
        .rev()
        .map(|ancestor| ancestor.name.as_str())
        .collect::<Vec<_>>()
        .join(" in ");
    format!("{} ({} in {})", area.name, area.area_type, path)
}

/// `"{name}"`, then `" [{status}]"` when status is set, then
/// `" in {area label}"` when the facility has an area.
pub fn facility_label(facility: &Facility, area_label: Option<&str>) -> String {
    let mut label = facility.name.clone();
    if !facility.status.is_empty() {
        label.push_str(&format!(" [{}]", facility.status));
    }
    if let Some(area_label) = area_label {
        label.push_str(" in ");
        label.push_str(area_label);
    }
    label
}

/// `"{name}"`, then `" <{email}>"` when an address is set.
pub fn contact_label(contact: &Contact) -> String {
    if contact.email.is_empty() {
        return contact.name.clone();
    }
    format!("{} <{}>", contact.name, contact.email)
}

/// `"{role name}"`, then `" @ {facility label}"` when bound to a facility.
pub fn role_label(role: &Role, facility_label: Option<&str>) -> String {
    match facility_label {
        Some(facility_label) => format!("{} @ {}", role.name, facility_label),
        None => role.name.to_string(),
    }
}
