use chrono::Local;

use taskboard::aggregate::StatusFilter;
use taskboard::client::Client;
use taskboard::config::Config;
use taskboard::dashboard::progress::feedback_channel;
use taskboard::Dashboard;


// TODO: change this value with the ID of a user of your backend
const USER_ID: &str = "1";

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::default();
    let client = Client::new(config.api_base_url.as_str()).unwrap();
    let (sender, receiver) = feedback_channel();
    let mut dashboard = Dashboard::new(client, config).unwrap()
        .with_feedback_channel(sender);

    if let Err(err) = dashboard.init().await {
        log::error!("Unable to start: {}", err);
        return;
    }
    println!("---- Users -----");
    for (id, name) in dashboard.user_choices() {
        println!("  {}\t{}", id, name);
    }

    let mut filters = dashboard.default_filters(USER_ID, Local::now().date_naive());
    filters.status = StatusFilter::All;
    println!("---- Tasks of user {} from {} to {} -----", filters.user_id, filters.date_from, filters.date_to);
    match dashboard.load_tasks(&filters).await {
        Err(err) => log::error!("{}", err),
        Ok(view) => print!("{}", view),
    }
    println!("({})", *receiver.borrow());
}
