//! Commands that talk to a running customers API.
//!
//! Results are printed to stdout as pretty JSON so they can be piped into
//! other tools.

use serde::Serialize;
use tracing::info;

use customers_client::CustomerClient;
use customers_core::{CustomerId, CustomerPayload, NameSlug, PageRequest};

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let text = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{text}");
    }
    Ok(())
}

/// Print one page of customers.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(api_url: &str, page: u32, size: u32) -> Result<(), Box<dyn std::error::Error>> {
    let client = CustomerClient::new(api_url)?;
    let page = client.list(PageRequest::new(page, size)).await?;
    print_json(&page)?;
    Ok(())
}

/// Print a customer by id.
///
/// # Errors
///
/// Returns an error if the id is malformed or the API request fails.
pub async fn get(api_url: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: CustomerId = id.parse()?;
    let client = CustomerClient::new(api_url)?;
    print_json(&client.get(id).await?)?;
    Ok(())
}

/// Print the customer with this exact name, if any.
///
/// Accepts either a slug (`jane-doe`) or a display name (`Jane Doe`).
///
/// # Errors
///
/// Returns an error if the name is blank or the API request fails.
pub async fn find(api_url: &str, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let slug = NameSlug::from_name(name)?;
    let client = CustomerClient::new(api_url)?;
    match client.find_by_name(&slug).await? {
        Some(customer) => print_json(&customer)?,
        None => info!(slug = %slug, "No customer with this name"),
    }
    Ok(())
}

/// Create a customer and print its id.
///
/// # Errors
///
/// Returns an error if the API rejects the customer or the request fails.
pub async fn create(
    api_url: &str,
    payload: CustomerPayload,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CustomerClient::new(api_url)?;
    let id = client.create(&payload).await?;
    print_json(&serde_json::json!({ "id": id }))?;
    Ok(())
}

/// Update a customer.
///
/// # Errors
///
/// Returns an error if the id is malformed, the API rejects the update, or
/// the request fails.
pub async fn update(
    api_url: &str,
    id: &str,
    payload: CustomerPayload,
) -> Result<(), Box<dyn std::error::Error>> {
    let id: CustomerId = id.parse()?;
    let client = CustomerClient::new(api_url)?;
    client.update(id, &payload).await?;
    info!(id = %id, "Customer updated");
    Ok(())
}

/// Delete a customer.
///
/// # Errors
///
/// Returns an error if the id is malformed or the API request fails.
pub async fn delete(api_url: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: CustomerId = id.parse()?;
    let client = CustomerClient::new(api_url)?;
    print_json(&client.delete(id).await?)?;
    Ok(())
}
