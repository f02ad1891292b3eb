//! AWS Lambda function for nearby restaurant lookup.
//!
//! Resolves the caller's coordinates or postal code into a locality and
//! returns matching restaurants from the search provider.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    nearby_eats_lambda_search::run().await
}
