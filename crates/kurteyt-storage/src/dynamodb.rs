use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use jiff::Timestamp;
use kurteyt_core::record::epoch_seconds;
use kurteyt_core::repository::Result;
use kurteyt_core::{
    OgSettings, Page, PageRequest, PutCondition, ReadRepository, RecordChanges, RedirectType,
    Repository, ShortId, ShortUrlRecord, StorageError, UpdateExpression, PARTITION_KEY,
};
use std::collections::HashMap;
use tracing::{debug, trace};

type Item = HashMap<String, AttributeValue>;

const TTL_NAME: &str = "#ttl";
const NOW_VALUE: &str = ":now";

/// DynamoDB implementation of the repository contract.
///
/// One item per short id, keyed by `PK`. The table's TTL attribute is `TTL`;
/// DynamoDB deletes expired items lazily, so reads filter them out as well.
#[derive(Debug, Clone)]
pub struct DynamoDbRepository {
    client: Client,
    table: String,
}

impl DynamoDbRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Builds a client from the default AWS provider chain.
    ///
    /// `region` and `endpoint_url` override what the environment provides;
    /// the endpoint override is how DynamoDB Local is reached.
    pub async fn connect(
        table: impl Into<String>,
        region: Option<String>,
        endpoint_url: Option<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;
        Self::new(Client::new(&config), table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates the table if it does not exist yet (local development and tests).
    pub async fn create_table(&self) -> Result<()> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(PARTITION_KEY)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| StorageError::Query(e.to_string()))?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(PARTITION_KEY)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| StorageError::Query(e.to_string()))?;

        let result = self
            .client
            .create_table()
            .table_name(&self.table)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                debug!(table = %self.table, "table already exists");
                Ok(())
            }
            Err(err) => Err(map_sdk_error(err)),
        }
    }

    fn key(id: &ShortId) -> Item {
        HashMap::from([(
            PARTITION_KEY.to_string(),
            AttributeValue::S(id.as_str().to_string()),
        )])
    }
}

fn now_value() -> AttributeValue {
    AttributeValue::N(epoch_seconds(Timestamp::now()).to_string())
}

fn map_sdk_error<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    match err {
        SdkError::TimeoutError(_) => StorageError::Timeout(message),
        SdkError::DispatchFailure(_) => StorageError::Unavailable(message),
        SdkError::ConstructionFailure(_) => StorageError::Conversion(message),
        _ => StorageError::Query(message),
    }
}

fn og_settings_to_attribute(og: &OgSettings) -> AttributeValue {
    let fields = [
        ("OgTitle", &og.og_title),
        ("OgDescription", &og.og_description),
        ("OgUrl", &og.og_url),
        ("OgImage", &og.og_image),
        ("OgImageAlt", &og.og_image_alt),
    ];
    AttributeValue::M(
        fields
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .map(|v| (name.to_string(), AttributeValue::S(v.clone())))
            })
            .collect(),
    )
}

fn og_settings_from_attribute(value: &AttributeValue) -> Result<OgSettings> {
    let map = value
        .as_m()
        .map_err(|_| StorageError::InvalidData("OgSettings is not a map".to_string()))?;
    let field = |name: &str| {
        map.get(name)
            .and_then(|v| v.as_s().ok())
            .map(ToString::to_string)
    };

    Ok(OgSettings {
        og_title: field("OgTitle"),
        og_description: field("OgDescription"),
        og_url: field("OgUrl"),
        og_image: field("OgImage"),
        og_image_alt: field("OgImageAlt"),
    })
}

fn to_item(record: &ShortUrlRecord) -> Item {
    let mut item = Item::from([
        (
            PARTITION_KEY.to_string(),
            AttributeValue::S(record.short_id.as_str().to_string()),
        ),
        (
            "ShortId".to_string(),
            AttributeValue::S(record.short_id.as_str().to_string()),
        ),
        (
            "TargetUrl".to_string(),
            AttributeValue::S(record.target_url.clone()),
        ),
        (
            "RedirectType".to_string(),
            AttributeValue::S(record.redirect_type.as_str().to_string()),
        ),
        (
            "NumDaysUntilExpire".to_string(),
            AttributeValue::N(record.num_days_until_expire.to_string()),
        ),
        ("TTL".to_string(), AttributeValue::N(record.ttl.to_string())),
        (
            "CreatedAt".to_string(),
            AttributeValue::S(record.created_at.to_string()),
        ),
    ]);
    if let Some(og) = &record.og_settings {
        item.insert("OgSettings".to_string(), og_settings_to_attribute(og));
    }
    if let Some(updated_at) = record.updated_at {
        item.insert(
            "UpdatedAt".to_string(),
            AttributeValue::S(updated_at.to_string()),
        );
    }
    item
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| StorageError::InvalidData(format!("missing string attribute {name}")))
}

fn number_attr<T: std::str::FromStr>(item: &Item, name: &str) -> Result<T> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<T>().ok())
        .ok_or_else(|| StorageError::InvalidData(format!("missing numeric attribute {name}")))
}

fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    raw.parse::<Timestamp>()
        .map_err(|e| StorageError::InvalidData(format!("invalid timestamp '{raw}': {e}")))
}

fn from_item(item: &Item) -> Result<ShortUrlRecord> {
    let short_id = ShortId::new(string_attr(item, PARTITION_KEY)?)
        .map_err(|e| StorageError::InvalidData(format!("stored short id: {e}")))?;
    // items written without a type are plain redirects
    let redirect_type = match item.get("RedirectType").and_then(|v| v.as_s().ok()) {
        Some(raw) => raw.parse::<RedirectType>().map_err(StorageError::InvalidData)?,
        None => RedirectType::Direct,
    };

    Ok(ShortUrlRecord {
        short_id,
        target_url: string_attr(item, "TargetUrl")?.to_string(),
        redirect_type,
        og_settings: item
            .get("OgSettings")
            .filter(|v| !v.is_null())
            .map(og_settings_from_attribute)
            .transpose()?,
        num_days_until_expire: number_attr(item, "NumDaysUntilExpire")?,
        ttl: number_attr(item, "TTL")?,
        created_at: parse_timestamp(string_attr(item, "CreatedAt")?)?,
        updated_at: item
            .get("UpdatedAt")
            .and_then(|v| v.as_s().ok())
            .map(|raw| parse_timestamp(raw))
            .transpose()?,
    })
}

/// The attributes an update writes, in a fixed order.
fn changed_attributes(changes: &RecordChanges) -> Vec<(&'static str, AttributeValue)> {
    let mut fields = Vec::new();
    if let Some(target_url) = &changes.target_url {
        fields.push(("TargetUrl", AttributeValue::S(target_url.clone())));
    }
    if let Some(redirect_type) = changes.redirect_type {
        fields.push((
            "RedirectType",
            AttributeValue::S(redirect_type.as_str().to_string()),
        ));
    }
    if let Some(og) = &changes.og_settings {
        fields.push(("OgSettings", og_settings_to_attribute(og)));
    }
    fields.push((
        "UpdatedAt",
        AttributeValue::S(changes.updated_at.to_string()),
    ));
    fields
}

#[async_trait]
impl ReadRepository for DynamoDbRepository {
    async fn get(&self, id: &ShortId) -> Result<Option<ShortUrlRecord>> {
        trace!(short_id = %id, table = %self.table, "fetching item from dynamodb");

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(id)))
            .consistent_read(false)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let Some(item) = output.item() else {
            return Ok(None);
        };
        let record = from_item(item)?;

        if record.is_expired(Timestamp::now()) {
            trace!(short_id = %id, "item is past its TTL");
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn scan(&self, request: PageRequest) -> Result<Page> {
        let limit = i32::try_from(request.limit)
            .map_err(|_| StorageError::Query(format!("page limit too large: {}", request.limit)))?;

        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .limit(limit)
            .set_exclusive_start_key(request.start_after.as_ref().map(Self::key))
            .filter_expression(format!("{TTL_NAME} > {NOW_VALUE}"))
            .expression_attribute_names(TTL_NAME, "TTL")
            .expression_attribute_values(NOW_VALUE, now_value())
            .send()
            .await
            .map_err(map_sdk_error)?;

        let records = output
            .items()
            .iter()
            .map(from_item)
            .collect::<Result<Vec<_>>>()?;
        let last_evaluated = output
            .last_evaluated_key()
            .and_then(|key| key.get(PARTITION_KEY))
            .and_then(|pk| pk.as_s().ok())
            .map(|pk| ShortId::new(pk.as_str()))
            .transpose()
            .map_err(|e| StorageError::InvalidData(format!("last evaluated key: {e}")))?;

        Ok(Page {
            records,
            last_evaluated,
        })
    }
}

#[async_trait]
impl Repository for DynamoDbRepository {
    async fn put(&self, record: &ShortUrlRecord, condition: PutCondition) -> Result<()> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(record)));

        if condition == PutCondition::NotExists {
            // An item past its TTL that DynamoDB has not reaped yet does not count.
            request = request
                .condition_expression(format!(
                    "attribute_not_exists({PARTITION_KEY}) OR {TTL_NAME} <= {NOW_VALUE}"
                ))
                .expression_attribute_names(TTL_NAME, "TTL")
                .expression_attribute_values(NOW_VALUE, now_value());
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                debug!(short_id = %record.short_id, "write with condition failed");
                Err(StorageError::ConditionFailed(record.short_id.to_string()))
            }
            Err(err) => Err(map_sdk_error(err)),
        }
    }

    async fn update(&self, id: &ShortId, changes: RecordChanges) -> Result<ShortUrlRecord> {
        let update = UpdateExpression::set(changed_attributes(&changes)).ok_or_else(|| {
            StorageError::Conversion("update has no attributes to set".to_string())
        })?;

        let mut names: HashMap<String, String> = update.names.into_iter().collect();
        names.insert(TTL_NAME.to_string(), "TTL".to_string());
        let mut values: HashMap<String, AttributeValue> = update.values.into_iter().collect();
        values.insert(NOW_VALUE.to_string(), now_value());

        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(id)))
            .update_expression(update.expression)
            .condition_expression(format!(
                "attribute_exists({PARTITION_KEY}) AND {TTL_NAME} > {NOW_VALUE}"
            ))
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                return Err(StorageError::ConditionFailed(id.to_string()));
            }
            Err(err) => return Err(map_sdk_error(err)),
        };

        let attributes = output.attributes().ok_or_else(|| {
            StorageError::InvalidData("update returned no attributes".to_string())
        })?;
        from_item(attributes)
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.attributes().is_some())
    }
}
