use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a user record.
///
/// The collection historically stored deactivated users as either `INACTIVO`
/// or `DESACTIVO`. Both spellings are read as [`Estado::Inactivo`]; only
/// `INACTIVO` is ever written back, so records migrate on their next update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Estado {
    #[serde(rename = "ACTIVO")]
    Activo,
    #[serde(rename = "INACTIVO", alias = "DESACTIVO")]
    Inactivo,
}

impl Estado {
    pub const ALL: [Estado; 2] = [Estado::Activo, Estado::Inactivo];

    pub fn as_str(self) -> &'static str {
        match self {
            Estado::Activo => "ACTIVO",
            Estado::Inactivo => "INACTIVO",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Estado::Activo)
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown estado `{0}` (expected ACTIVO or INACTIVO)")]
pub struct UnknownEstado(pub String);

impl FromStr for Estado {
    type Err = UnknownEstado;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVO" => Ok(Estado::Activo),
            "INACTIVO" | "DESACTIVO" => Ok(Estado::Inactivo),
            _ => Err(UnknownEstado(s.to_string())),
        }
    }
}

/// A record of the remote collection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub usuario: String,
    pub estado: Estado,
    /// Older records may lack a sector; they are skipped by the name
    /// uniqueness scan.
    #[serde(default)]
    pub sector: Option<i64>,
}

impl User {
    pub fn new(id: impl Into<String>, usuario: impl Into<String>, estado: Estado, sector: i64) -> Self {
        Self {
            id: id.into(),
            usuario: usuario.into(),
            estado,
            sector: Some(sector),
        }
    }

    /// Case-insensitive comparison of display names.
    pub fn has_name(&self, usuario: &str) -> bool {
        self.usuario.to_lowercase() == usuario.to_lowercase()
    }

    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(id) = &patch.id {
            self.id = id.clone();
        }
        if let Some(usuario) = &patch.usuario {
            self.usuario = usuario.clone();
        }
        if let Some(estado) = patch.estado {
            self.estado = estado;
        }
        if patch.sector.is_some() {
            self.sector = patch.sector;
        }
    }
}

/// Body of a partial update. Absent fields are left untouched remotely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<i64>,
}

impl UserPatch {
    pub fn estado(estado: Estado) -> Self {
        Self {
            estado: Some(estado),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.usuario.is_none() && self.estado.is_none() && self.sector.is_none()
    }
}

impl From<&User> for UserPatch {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            usuario: Some(user.usuario.clone()),
            estado: Some(user.estado),
            sector: user.sector,
        }
    }
}

/// Form state behind the create/edit dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub id: Option<String>,
    pub usuario: Option<String>,
    pub estado: Option<Estado>,
    pub sector: Option<i64>,
}

impl UserDraft {
    pub fn for_edit(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            usuario: Some(user.usuario.clone()),
            estado: Some(user.estado),
            sector: user.sector,
        }
    }

    /// Names of required fields that are absent or blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(self.id.as_deref()) {
            missing.push("id");
        }
        if is_blank(self.usuario.as_deref()) {
            missing.push("usuario");
        }
        if self.estado.is_none() {
            missing.push("estado");
        }
        if self.sector.is_none() {
            missing.push("sector");
        }
        missing
    }

    /// Turn a complete draft into a record, trimming the text fields.
    pub fn complete(self) -> Result<User, Vec<&'static str>> {
        let missing = self.missing_fields();
        match self {
            UserDraft {
                id: Some(id),
                usuario: Some(usuario),
                estado: Some(estado),
                sector: Some(sector),
            } if missing.is_empty() => Ok(User::new(id.trim(), usuario.trim(), estado, sector)),
            _ => Err(missing),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
