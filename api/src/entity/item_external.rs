use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_item_external")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Text")]
    pub token_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub meta_data_uri: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_uri: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub oss_uri: Option<String>,
    pub is_uploaded_oss: bool,
    pub upload_status: i32,
    pub create_time: i64,
    pub update_time: i64,
}

impl Model {
    /// Serving URI: the OSS copy once uploaded, the origin URI otherwise.
    pub fn display_image(&self) -> Option<&str> {
        if self.is_uploaded_oss {
            if let Some(oss_uri) = self.oss_uri.as_deref() {
                return Some(oss_uri);
            }
        }
        self.image_uri.as_deref()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(is_uploaded: bool, oss: Option<&str>, image: Option<&str>) -> Model {
        Model {
            id: 1,
            chain_id: 1,
            collection_address: "0xc".into(),
            token_id: "7".into(),
            meta_data_uri: None,
            image_uri: image.map(str::to_string),
            oss_uri: oss.map(str::to_string),
            is_uploaded_oss: is_uploaded,
            upload_status: 0,
            create_time: 0,
            update_time: 0,
        }
    }

    #[test]
    fn prefers_the_oss_copy_once_uploaded() {
        let model = row(true, Some("https://oss/7.png"), Some("ipfs://7.png"));
        assert_eq!(model.display_image(), Some("https://oss/7.png"));
    }

    #[test]
    fn falls_back_to_the_origin_uri() {
        assert_eq!(
            row(false, Some("https://oss/7.png"), Some("ipfs://7.png")).display_image(),
            Some("ipfs://7.png")
        );
        assert_eq!(row(true, None, Some("ipfs://7.png")).display_image(), Some("ipfs://7.png"));
        assert_eq!(row(false, None, None).display_image(), None);
    }
}
