use crate::actors::{Retirement, SessionActor};
use crate::models::Inbound;
use crate::sink::RowSink;
use crate::storage::SessionStorage;
use crate::transport::Transport;
use crate::types::SessionId;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Process-scoped dependencies shared by every session actor.
pub struct BotContext<T: Transport, S: RowSink> {
    pub transport: T,
    pub sink: S,
    pub sessions: SessionStorage
}

impl<T: Transport, S: RowSink> BotContext<T, S> {
    pub fn new(transport: T, sink: S) -> Self {
        Self {
            transport,
            sink,
            sessions: SessionStorage::new()
        }
    }
}

/// Routes inbound chat events to one actor per session.
pub struct BotEngine<T: Transport, S: RowSink> {
    context: Arc<BotContext<T, S>>,
    backpressure: usize,
    idle_timeout: Duration
}

impl<T: Transport, S: RowSink> BotEngine<T, S> {
    /// Creates a new engine around the shared context.
    pub fn new(context: Arc<BotContext<T, S>>) -> Self {
        Self {
            context,
            backpressure: 256,
            idle_timeout: DEFAULT_IDLE_TIMEOUT
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Bounded channel feeding [`BotEngine::run`].
    pub fn channel(&self) -> (mpsc::Sender<Inbound>, mpsc::Receiver<Inbound>) {
        mpsc::channel(self.backpressure)
    }

    /// Dispatches events until the channel closes, then drains every actor.
    pub async fn run(&self, mut receiver: mpsc::Receiver<Inbound>) -> anyhow::Result<()> {
        let (mut actors, mut retirements) = ActorTable::new(self.context.clone(), self.idle_timeout);

        info!("Dispatching chat events");

        // NOTE: One actor per session keeps each user's inputs strictly in arrival order while sessions run independently.
        loop {
            tokio::select! {
                inbound = receiver.recv() => match inbound {
                    Some(inbound) => actors.dispatch(inbound),
                    None => break
                },
                Some(retirement) = retirements.recv() => {
                    actors.retire(retirement);
                }
            }
        }

        actors.despawn_all().await;

        info!("Dispatcher stopped");

        Ok(())
    }
}

/// The live actor of every session that has one.
pub(crate) struct ActorTable<T: Transport, S: RowSink> {
    context: Arc<BotContext<T, S>>,
    idle_timeout: Duration,
    actors: HashMap<SessionId, SessionActor>,
    retirements: mpsc::UnboundedSender<Retirement>
}

impl<T: Transport, S: RowSink> ActorTable<T, S> {
    /// Creates an empty table and the channel its actors report their retirement on.
    pub(crate) fn new(context: Arc<BotContext<T, S>>, idle_timeout: Duration) -> (Self, mpsc::UnboundedReceiver<Retirement>) {
        let (retirements, retired) = mpsc::unbounded_channel();

        let table = Self {
            context,
            idle_timeout,
            actors: HashMap::new(),
            retirements
        };

        (table, retired)
    }

    /// Hands the event to its session's actor, spawning one when needed.
    pub(crate) fn dispatch(&mut self, inbound: Inbound) {
        let session_id = inbound.session_id;

        let Err(inbound) = self.actor_for(session_id).accept(inbound) else {
            return;
        };

        //NOTE: The actor retired while idle; its successor waits for it to release the session
        self.actors.remove(&session_id);

        if self.actor_for(session_id).accept(inbound).is_err() {
            error!("Session actor for [{session_id}] could not accept an event");
        }
    }

    /// Forgets a retired actor, unless it was already replaced. Returns whether an entry was removed.
    pub(crate) fn retire(&mut self, retirement: Retirement) -> bool {
        let current = self.actors
            .get(&retirement.session_id)
            .is_some_and(|actor| actor.generation() == retirement.generation);

        if current {
            self.actors.remove(&retirement.session_id);
            debug!("Forgot retired actor of session [{}] ({} actors live)", retirement.session_id, self.len());
        }

        current
    }

    pub(crate) fn len(&self) -> usize {
        self.actors.len()
    }

    /// Closes every inbox and waits until all queued events are processed.
    pub(crate) async fn despawn_all(self) {
        let despawns = self.actors.into_values().map(|actor| actor.despawn());

        for result in join_all(despawns).await {
            if let Err(error) = result {
                error!("A session actor did not despawn gracefully: {error:?}");
            }
        }
    }

    fn actor_for(&mut self, session_id: SessionId) -> &SessionActor {
        self.actors.entry(session_id).or_insert_with(|| {
            debug!("Spawning actor for session [{session_id}] ({} sessions known)", self.context.sessions.len());
            SessionActor::new(session_id, self.context.clone(), self.idle_timeout, self.retirements.clone())
        })
    }
}
