use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use webapp_ip_restriction::{
    Error, Result, Subscription, SubscriptionChoice, SubscriptionChooser,
};

/*-------------------------------------------------------------------------------------------------
  Subscription Prompt
-------------------------------------------------------------------------------------------------*/

/// Asks the operator on the terminal which of the linked subscriptions to search. The prompt
/// goes to stderr so that stdout only carries the result document.
#[derive(Debug, Default)]
pub struct StdinChooser;

#[async_trait]
impl SubscriptionChooser for StdinChooser {
    async fn choose(&self, subscriptions: &[Subscription]) -> Result<SubscriptionChoice> {
        eprintln!("Several subscriptions are linked to this identity:");
        eprintln!("  [0] (ALL SUBSCRIPTIONS)");
        for (index, subscription) in subscriptions.iter().enumerate() {
            eprintln!("  [{}] {subscription}", index + 1);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("Choose a subscription [0-{}]: ", subscriptions.len());
            let line = lines.next_line().await?.ok_or_else(|| {
                Error::Configuration("no subscription was chosen".to_string())
            })?;

            match parse_choice(&line, subscriptions) {
                Some(choice) => return Ok(choice),
                None => eprintln!("`{}` is not one of the listed choices", line.trim()),
            }
        }
    }
}

/*--------------------------------------------------------------------------------------
  Parse Choice
--------------------------------------------------------------------------------------*/

/// `0` selects every subscription; `1..=n` selects one by its listed position.
pub fn parse_choice(input: &str, subscriptions: &[Subscription]) -> Option<SubscriptionChoice> {
    let index: usize = input.trim().parse().ok()?;
    match index {
        0 => Some(SubscriptionChoice::All),
        _ => subscriptions
            .get(index - 1)
            .map(|subscription| SubscriptionChoice::One(subscription.subscription_id.clone())),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
