use chika::schemas::{Property, PropertyCreate};
use chika::storage;
use sea_orm::DatabaseConnection;

/// Builder for creating test properties
pub struct PropertyBuilder {
    name: String,
    address: String,
    price: f64,
}

#[allow(dead_code)]
impl PropertyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: "東京都".to_string(),
            price: 1000000.0,
        }
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn build(self) -> PropertyCreate {
        PropertyCreate::new(self.name, self.address, self.price)
    }

    pub async fn create(self, db: &DatabaseConnection) -> Property {
        storage::create_property(db, self.build())
            .await
            .expect("Failed to create test property")
    }
}
