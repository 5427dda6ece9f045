use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::MenuNode;
use crate::schema::{menu_items, menus};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = menus)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Menu {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = menus)]
pub struct NewMenu<'a> {
    pub slug: &'a str,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(table_name = menu_items)]
#[diesel(belongs_to(Menu))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItem {
    pub id: i32,
    pub menu_id: i32,
    pub parent_id: Option<i32>,
    pub label: String,
    pub href: String,
    pub target: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItem<'a> {
    pub menu_id: i32,
    pub parent_id: Option<i32>,
    pub label: &'a str,
    pub href: &'a str,
    pub target: Option<&'a str>,
    pub sort_order: i32,
    pub active: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct MenuQuery {
    pub slug: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SaveMenuRequest {
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuNode>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MenuResponse {
    pub success: bool,
    pub slug: String,
    pub name: Option<String>,
    pub items: Vec<MenuNode>,
}

#[derive(Serialize, Debug)]
pub struct MenuList {
    pub success: bool,
    pub menus: Vec<Menu>,
}
