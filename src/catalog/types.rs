use serde::{Deserialize, Serialize};

/// A medicine row as exposed by the API. Field names follow the table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub medicine_id: i64,
    pub name: String,
    pub composition: String,
    pub uses: String,
    pub side_effects: String,
    pub image_url: String,
    pub manufacturer: String,
    pub excellent_review_pct: f64,
    pub average_review_pct: f64,
    pub poor_review_pct: f64,
}

/// A medicine row before insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub composition: String,
    pub uses: String,
    pub side_effects: String,
    pub image_url: String,
    pub manufacturer: String,
    pub excellent_review_pct: f64,
    pub average_review_pct: f64,
    pub poor_review_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}
