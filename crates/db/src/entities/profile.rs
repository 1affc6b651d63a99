//! Profile entity (stores password and public blog profile fields).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    /// Same as user.id (1:1 relationship)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Password hash (Argon2)
    #[sea_orm(nullable)]
    pub password: Option<String>,

    /// Blog title or headline shown beneath the author's name
    #[sea_orm(nullable)]
    pub blog_title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Storage key of the cropped profile picture (200x200)
    #[sea_orm(nullable)]
    pub profile_picture: Option<String>,

    /// Storage key of the cropped cover photo (1920x300)
    #[sea_orm(nullable)]
    pub cover_photo: Option<String>,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    /// Personal website URL
    #[sea_orm(nullable)]
    pub website: Option<String>,

    /// Twitter handle, at most 16 characters
    #[sea_orm(nullable)]
    pub twitter: Option<String>,

    /// Github username
    #[sea_orm(nullable)]
    pub github: Option<String>,
}

impl Model {
    /// The profile's location line: `"city, country"`, `"city"`,
    /// `"country"`, or `None` when neither field is set.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (Some(city), None) => Some(city.to_string()),
            (None, Some(country)) => Some(country.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
