//! Reusable validators for [`crate::Entry`].

use crate::map_entry::SettingEnum;

/// Accepts exactly the variants declared by `K`.
pub fn enum_validator<K: SettingEnum>() -> impl Fn(&K) -> bool + Send + Sync + 'static {
    |value: &K| K::variants().contains(value)
}

/// Rejects empty or whitespace-only strings.
#[allow(clippy::ptr_arg)]
pub fn non_empty_string(value: &String) -> bool {
    !value.trim().is_empty()
}
