use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::engine::BotContext;
use crate::models::{Dialogue, Effect, Event, Inbound, Reply};
use crate::sink::RowSink;
use crate::transport::Transport;
use crate::types::{MessageId, SessionId};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

/// Sent by an actor as its last act, once it has released its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retirement {
    pub session_id: SessionId,
    pub generation: u64
}

/// Sequential worker owning one session's inbox.
pub struct SessionActor {
    sender: mpsc::UnboundedSender<Inbound>,
    handle: JoinHandle<()>,
    generation: u64
}

impl SessionActor {
    /// Spawns a new actor for the session.
    ///
    /// The actor holds the session's dialogue lock for its whole life, so an actor
    /// spawned to replace a retiring one only starts once the old inbox is drained.
    pub fn new<T: Transport, S: RowSink>(
        session_id: SessionId,
        context: Arc<BotContext<T, S>>,
        idle_timeout: Duration,
        retirements: mpsc::UnboundedSender<Retirement>
    ) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Inbound>();
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);

        let handle = spawn(async move {
            let slot = context.sessions.checkout(session_id);
            let mut dialogue = slot.clone().lock_owned().await;

            loop {
                match timeout(idle_timeout, receiver.recv()).await {
                    Ok(Some(inbound)) => handle_inbound(&context, &mut dialogue, inbound).await,
                    Ok(None) => break,
                    Err(_) => {
                        //NOTE: Close first so nothing new is accepted, then drain what already arrived
                        debug!("Session [{session_id}] idle, retiring actor");
                        receiver.close();

                        while let Some(inbound) = receiver.recv().await {
                            handle_inbound(&context, &mut dialogue, inbound).await;
                        }

                        break;
                    }
                }
            }

            drop(dialogue);
            drop(slot);

            if context.sessions.release(session_id) {
                debug!("Session [{session_id}] terminated and released");
            }

            //NOTE: Nobody listens once the dispatcher has stopped
            let _ = retirements.send(Retirement { session_id, generation });
        });

        Self { sender, handle, generation }
    }

    /// Queues an event, handing it back if the actor has retired.
    pub fn accept(&self, inbound: Inbound) -> Result<(), Inbound> {
        self.sender.send(inbound).map_err(|error| error.0)
    }

    /// Tells this actor apart from earlier and later actors of the same session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_retired(&self) -> bool {
        self.sender.is_closed()
    }

    /// Closes the inbox and waits for every queued event to be processed.
    pub async fn despawn(self) -> Result<(), JoinError> {
        drop(self.sender);
        self.handle.await
    }
}

async fn handle_inbound<T: Transport, S: RowSink>(context: &BotContext<T, S>, dialogue: &mut Dialogue, inbound: Inbound) {
    let session_id = inbound.session_id;
    let mut origin = None;

    if let Event::Button { callback_id, message_id, .. } = &inbound.event {
        origin = *message_id;

        if let Err(error) = context.transport.acknowledge(callback_id).await {
            warn!("Session [{session_id}] button press could not be acknowledged: {error}");
        }
    }

    let step = dialogue.apply(&inbound.event, &inbound.sender);
    deliver(context, session_id, origin, &step.replies).await;

    let Some(Effect::Submit { purchase, submitter }) = step.effect else {
        debug!("Session [{session_id}] now in state [{:?}]", dialogue.state());
        return;
    };

    let outcome = match context.sink.append_submission(&purchase, &submitter).await {
        Ok(()) => dialogue.complete_submission(),
        Err(_) => dialogue.fail_submission()
    };

    deliver(context, session_id, origin, &outcome.replies).await;

    debug!("Session [{session_id}] now in state [{:?}]", dialogue.state());
}

async fn deliver<T: Transport, S: RowSink>(context: &BotContext<T, S>, session_id: SessionId, origin: Option<MessageId>, replies: &[Reply]) {
    for reply in replies {
        let result = match (reply, origin) {
            (Reply::Edit { text, keyboard }, Some(message_id)) => {
                context.transport.edit_message(session_id, message_id, text, keyboard.as_ref()).await
            }
            (Reply::Send { text, keyboard }, _) | (Reply::Edit { text, keyboard }, None) => {
                context.transport.send_text(session_id, text, keyboard.as_ref()).await.map(|_| ())
            }
        };

        if let Err(error) = result {
            warn!("Session [{session_id}] reply could not be delivered: {error}");
        }
    }
}
