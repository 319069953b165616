use entity::User;

use crate::ValidationError;

/// Uniqueness rules for a new user against `existing`: the id must be unused
/// anywhere, the name must be unused (case-insensitive) among users that
/// carry a sector.
pub fn check_create<'a>(
    candidate: &User,
    existing: impl IntoIterator<Item = &'a User> + Clone,
) -> Result<(), ValidationError> {
    check_unique_id(candidate, existing.clone())?;
    if existing
        .into_iter()
        .any(|u| u.sector.is_some() && u.has_name(&candidate.usuario))
    {
        return Err(ValidationError::DuplicateName(candidate.usuario.clone()));
    }
    Ok(())
}

pub fn check_unique_id<'a>(
    candidate: &User,
    existing: impl IntoIterator<Item = &'a User>,
) -> Result<(), ValidationError> {
    if existing.into_iter().any(|u| u.id == candidate.id) {
        return Err(ValidationError::DuplicateId(candidate.id.clone()));
    }
    Ok(())
}

/// An edited user only clashes with a *different* user holding its name.
pub fn check_edit<'a>(
    candidate: &User,
    existing: impl IntoIterator<Item = &'a User>,
) -> Result<(), ValidationError> {
    let clash = existing
        .into_iter()
        .any(|u| u.id != candidate.id && u.sector.is_some() && u.has_name(&candidate.usuario));
    if clash {
        return Err(ValidationError::DuplicateName(candidate.usuario.clone()));
    }
    Ok(())
}
