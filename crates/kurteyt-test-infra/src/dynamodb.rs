use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};

const PORT: u16 = 8000;

/// Test fixture for DynamoDB Local running in memory.
pub struct DynamoDbLocal {
    container: ContainerAsync<GenericImage>,
}

impl DynamoDbLocal {
    pub async fn new() -> Result<Self> {
        let container = GenericImage::new("amazon/dynamodb-local", "2.5.4")
            .with_exposed_port(PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("CorsParams"))
            .with_cmd(["-jar", "DynamoDBLocal.jar", "-inMemory", "-sharedDb"])
            .start()
            .await?;

        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(PORT).await?)
    }

    /// Endpoint URL to hand to the AWS SDK.
    pub async fn endpoint_url(&self) -> Result<String> {
        Ok(format!("http://{}:{}", self.host().await?, self.port().await?))
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
