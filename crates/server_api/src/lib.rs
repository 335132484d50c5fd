use shared::{
    domain::{Counter, Operation},
    error::{ApiError, ErrorCode},
};
use storage::{StoredCounter, Storage};
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn get_counter(ctx: &ApiContext) -> Result<Counter, ApiError> {
    let counter = ctx.storage.load_counter().await.map_err(internal)?;
    Ok(to_counter(counter))
}

pub async fn update_counter(ctx: &ApiContext, operation: Operation) -> Result<Counter, ApiError> {
    let counter = ctx
        .storage
        .apply_operation(operation)
        .await
        .map_err(internal)?;
    debug!(?operation, value = counter.value, "counter updated");
    Ok(to_counter(counter))
}

fn to_counter(stored: StoredCounter) -> Counter {
    Counter {
        id: stored.id,
        value: stored.value,
        updated_at: stored.updated_at,
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::COUNTER_ID;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn get_counter_returns_seeded_row() {
        let ctx = setup().await;
        let counter = get_counter(&ctx).await.expect("counter");
        assert_eq!(counter.id, COUNTER_ID);
        assert_eq!(counter.value, 0);
    }

    #[tokio::test]
    async fn update_counter_replaces_value_and_timestamp() {
        let ctx = setup().await;
        let before = get_counter(&ctx).await.expect("counter");

        let after = update_counter(&ctx, Operation::Increment)
            .await
            .expect("update");
        assert_eq!(after.value, before.value + 1);
        assert!(after.updated_at >= before.updated_at);

        let after = update_counter(&ctx, Operation::Decrement)
            .await
            .expect("update");
        assert_eq!(after.value, before.value);
    }
}
