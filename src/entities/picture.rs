use sea_orm::{entity::prelude::*, sea_query::StringLen, Iterable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Picture slot on a car. Multipart file fields and documentation keys use these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    #[sea_orm(string_value = "FRONT")]
    Front,
    #[sea_orm(string_value = "BACK")]
    Back,
    #[sea_orm(string_value = "LEFT")]
    Left,
    #[sea_orm(string_value = "RIGHT")]
    Right,
    #[sea_orm(string_value = "INSIDE")]
    Inside,
    #[sea_orm(string_value = "ENGINE")]
    Engine,
    #[sea_orm(string_value = "TRUNK")]
    Trunk,
    #[sea_orm(string_value = "WHEEL")]
    Wheel,
    #[sea_orm(string_value = "DASHBOARD")]
    Dashboard,
    #[sea_orm(string_value = "SEAT")]
    Seat,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Front => "FRONT",
            Category::Back => "BACK",
            Category::Left => "LEFT",
            Category::Right => "RIGHT",
            Category::Inside => "INSIDE",
            Category::Engine => "ENGINE",
            Category::Trunk => "TRUNK",
            Category::Wheel => "WHEEL",
            Category::Dashboard => "DASHBOARD",
            Category::Seat => "SEAT",
            Category::Other => "OTHER",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|c| c.as_str()).collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter().find(|c| c.as_str() == s).ok_or(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "picture")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: Category,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    #[sea_orm(column_type = "Text")]
    pub key: String,
    pub format: String,
    pub size: i64,
    pub car_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Car,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
