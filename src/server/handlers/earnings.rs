use axum::extract::{Extension, Json};

use crate::auth::User;
use crate::entities::EarningsSummary;
use crate::error::Error;
use crate::server::DynAPI;

pub async fn summary(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<EarningsSummary>, Error> {
    let summary = api.earnings_summary(user).await?;

    Ok(summary.into())
}
