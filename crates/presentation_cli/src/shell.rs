//! Terminal loop around a conversation session

use application::{ConversationSession, TurnOutcome};
use chrono::NaiveDateTime;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const GREETING: &str = "SkyQuery: ask me about the weather anywhere. Type 'exit' to quit.\n";
const PROMPT: &str = "> ";
const GOODBYE: &str = "Goodbye!\n";

/// Local wall-clock time
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Run turns until "exit" or end of input
pub async fn run_chat<R, W>(
    session: &mut ConversationSession,
    input: R,
    output: &mut W,
    now: fn() -> NaiveDateTime,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(GREETING.as_bytes()).await?;
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("End of input");
            output.write_all(b"\n").await?;
            break;
        };

        match session.respond(&line, now()).await {
            TurnOutcome::Exit => {
                output.write_all(GOODBYE.as_bytes()).await?;
                break;
            },
            TurnOutcome::Empty => {},
            TurnOutcome::Reply(reply) => {
                output.write_all(reply.message.as_bytes()).await?;
                output.write_all(b"\n\n").await?;
            },
        }
    }

    output.flush().await
}

/// Answer one question
pub async fn run_once<W>(
    session: &mut ConversationSession,
    question: &str,
    output: &mut W,
    now: NaiveDateTime,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if let TurnOutcome::Reply(reply) = session.respond(question, now).await {
        output.write_all(reply.message.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }
    output.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use application::{
        CurrentConditions, DailySummary, ExtractionContext, GeoLocationPort, GeocodeCandidate,
        HistoricalObservation, IntentError, IntentExtractor, IpLocation, LocationResolver,
        ProviderError, WeatherDispatcher, WeatherPort,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use domain::{GeoLocation, ResolvedDate, StructuredQuery};

    use super::*;

    /// Rejects everything as off-topic and counts calls
    #[derive(Debug, Default)]
    struct OffTopic(AtomicUsize);

    #[async_trait]
    impl IntentExtractor for OffTopic {
        async fn extract(
            &self,
            _utterance: &str,
            _context: &ExtractionContext,
        ) -> Result<StructuredQuery, IntentError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(IntentError::NotWeatherRelated)
        }
    }

    #[derive(Debug)]
    struct Offline;

    #[async_trait]
    impl WeatherPort for Offline {
        async fn current(&self, _: &GeoLocation) -> Result<CurrentConditions, ProviderError> {
            Err(ProviderError::NetworkFailure("offline".into()))
        }

        async fn forecast(
            &self,
            _: &GeoLocation,
            _: &ResolvedDate,
        ) -> Result<Vec<DailySummary>, ProviderError> {
            Err(ProviderError::NetworkFailure("offline".into()))
        }

        async fn historical(
            &self,
            _: &GeoLocation,
            _: NaiveDate,
            _: NaiveDate,
        ) -> Result<HistoricalObservation, ProviderError> {
            Err(ProviderError::NetworkFailure("offline".into()))
        }

        async fn geocode(&self, _: &str) -> Result<Vec<GeocodeCandidate>, ProviderError> {
            Err(ProviderError::NetworkFailure("offline".into()))
        }
    }

    #[async_trait]
    impl GeoLocationPort for Offline {
        async fn locate(&self) -> Result<IpLocation, ProviderError> {
            Err(ProviderError::NetworkFailure("offline".into()))
        }
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn session(extractor: Arc<OffTopic>) -> ConversationSession {
        let weather: Arc<dyn WeatherPort> = Arc::new(Offline);
        let locations = LocationResolver::new(Arc::clone(&weather), Arc::new(Offline));
        ConversationSession::new(extractor, WeatherDispatcher::new(weather, locations))
    }

    #[tokio::test]
    async fn chat_stops_at_exit() {
        let extractor = Arc::new(OffTopic::default());
        let mut session = session(Arc::clone(&extractor));
        let input: &[u8] = b"tell me a joke\n\n  EXIT  \nweather in Oslo\n";
        let mut output = Vec::new();

        run_chat(&mut session, input, &mut output, fixed_now)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with(GREETING));
        assert!(text.contains("only help with weather"));
        assert!(text.ends_with(GOODBYE));
        assert_eq!(extractor.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn chat_ends_quietly_at_eof() {
        let extractor = Arc::new(OffTopic::default());
        let mut session = session(Arc::clone(&extractor));
        let input: &[u8] = b"";
        let mut output = Vec::new();

        run_chat(&mut session, input, &mut output, fixed_now)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, format!("{GREETING}{PROMPT}\n"));
        assert_eq!(extractor.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn once_prints_single_reply() {
        let extractor = Arc::new(OffTopic::default());
        let mut session = session(Arc::clone(&extractor));
        let mut output = Vec::new();

        run_once(&mut session, "what is love", &mut output, fixed_now())
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("only help with weather"));
        assert!(text.ends_with('\n'));
    }
}
