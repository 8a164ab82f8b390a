pub mod dynamodb;
pub mod memory;
pub mod mysql;

pub use dynamodb::DynamoDbRepository;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
