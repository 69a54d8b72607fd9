//! This module provides a client to fetch users and task records from the backend HTTP API

use std::error::Error;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::day_record::RawDayRecord;
use crate::traits::{TaskQuery, TaskSource};
use crate::user::User;

const USERS_PATH: &str = "api/users";
const DATA_PATH: &str = "api/data";


/// A [`TaskSource`] that fetches its data from the backend
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }
        // So that joining relative paths keeps any path prefix
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL of `GET /api/users`
    pub fn users_url(&self) -> Result<Url, Box<dyn Error>> {
        Ok(self.base_url.join(USERS_PATH)?)
    }

    /// The URL of `GET /api/data` for a query
    pub fn data_url(&self, query: &TaskQuery) -> Result<Url, Box<dyn Error>> {
        let mut url = self.base_url.join(DATA_PATH)?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<String, Box<dyn Error>> {
        log::debug!("GET {}", url);
        let response = self.http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} for {}", response.status(), url).into());
        }
        let text = response.text().await?;
        Ok(text)
    }
}

#[async_trait]
impl TaskSource for Client {
    async fn get_users(&self) -> Result<Vec<User>, Box<dyn Error>> {
        let url = self.users_url()?;
        let text = self.get(url).await?;
        let users: Vec<User> = serde_json::from_str(&text)?;
        log::info!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn get_day_records(&self, query: &TaskQuery) -> Result<Vec<RawDayRecord>, Box<dyn Error>> {
        let url = self.data_url(query)?;
        let text = self.get(url).await?;
        let days: Vec<RawDayRecord> = serde_json::from_str(&text)?;
        log::info!("Fetched {} day records for user {} ({})", days.len(), query.user_id, query.window);
        Ok(days)
    }
}
