//! CRM item listing across contacts, companies, deals, and tickets.

// crates.io
use futures::future;
use oauth2::{
	AsyncHttpClient,
	http::{
		Method, Request,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialBlob, TokenSecret},
	crm::{self, CRM_ENDPOINTS, CrmEndpoint, IntegrationItem},
	error::ConfigError,
	flows::{Integration, common},
	http::{ProviderHttpClient, ResponseMetadataSlot},
	oauth::{OutboundCall, TransportErrorMapper},
	obs::{self, FlowKind},
};

/// First page of a CRM object listing.
#[derive(Debug, Default, Deserialize)]
struct ObjectPage {
	#[serde(default)]
	results: Option<Vec<JsonValue>>,
}

impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the first page of every CRM collection and normalizes the results.
	///
	/// `credentials` may be the JSON object returned by the token endpoint or its string
	/// serialization. Collections are queried concurrently but items keep the fixed
	/// contacts, companies, deals, tickets order. A collection answering with a non-200
	/// status is logged and contributes no items; any other failure aborts the whole fetch
	/// with [`Error::Fetch`].
	pub async fn fetch_items(
		&self,
		credentials: impl Into<JsonValue>,
	) -> Result<Vec<IntegrationItem>> {
		let credentials = credentials.into();

		common::observe(FlowKind::ItemFetch, "fetch_items", async move {
			let credentials = CredentialBlob::from_value(credentials)?;
			let access_token = credentials.access_token().ok_or(Error::MissingAccessToken)?;
			let pages = future::try_join_all(
				CRM_ENDPOINTS.iter().map(|endpoint| self.fetch_object_page(endpoint, &access_token)),
			)
			.await
			.map_err(Error::fetch)?;
			let items = pages.into_iter().flatten().collect::<Vec<_>>();

			obs::log_fetch_summary(items.len());

			Ok(items)
		})
		.await
	}

	/// Lists one collection; non-200 answers yield an empty page.
	pub(crate) async fn fetch_object_page(
		&self,
		endpoint: &CrmEndpoint,
		access_token: &TokenSecret,
	) -> Result<Vec<IntegrationItem>> {
		let call = OutboundCall::CrmObjects(endpoint.path);
		let url = endpoint
			.url(&self.config.endpoints.api_base, self.config.page_size)
			.map_err(|source| ConfigError::InvalidUrl { name: "CRM objects", source })?;
		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
			.header(CONTENT_TYPE, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());

		obs::log_object_query(endpoint.path);

		let response = handle.call(request).await.map_err(|err| {
			let metadata = meta.take();

			self.transport_mapper.map_transport_error(call, metadata.as_ref(), err)
		})?;
		let status = response.status().as_u16();

		if status != 200 {
			let retry_after = meta.take().and_then(|metadata| metadata.retry_after);

			obs::log_object_rejected(
				endpoint.path,
				Some(status),
				retry_after,
				&String::from_utf8_lossy(response.body()),
			);
			obs::record_items_fetched(endpoint.path, 0);

			return Ok(Vec::new());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let page: ObjectPage = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::ResponseParse { source, status: Some(status) })?;
		let template = &self.config.endpoints.record_url_template;
		let items = page
			.results
			.unwrap_or_default()
			.iter()
			.map(|raw| crm::normalize_with(raw, &endpoint.object, template))
			.collect::<Vec<_>>();

		obs::log_objects_found(endpoint.path, items.len());
		obs::record_items_fetched(endpoint.path, items.len());

		Ok(items)
	}
}
