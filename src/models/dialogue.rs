use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::prompts::{
    self, BLANK_ERROR, CANCELLED, CANCEL_BUTTON, CANCEL_COMMAND, DATE_PROMPT, DESCRIPTION_PROMPT, FINISHED,
    NEW_ENTRY_BUTTON, NEXT_DATE_PROMPT, NOTE_PROMPT, PRICE_ERROR, PRICE_PROMPT, QUANTITY_ERROR, QUANTITY_PROMPT,
    SELLER_PROMPT, START_COMMAND, SUBMITTED, UNIT_PROMPT, WRITE_FAILED
};
use crate::models::{Action, Event, Purchase, Reply, SessionRecord, Submitter};
use crate::types::{parse_decimal, round_total, PurchaseDate, ValidationError};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfirmationPhase {
    /// Summary shown, waiting for confirm or cancel.
    Review,
    /// Confirmed; the row is being appended.
    Submitting,
    /// Row appended, waiting for again or exit.
    Submitted
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum DialogueState {
    AwaitDate,
    AwaitSeller,
    AwaitDescription,
    AwaitPrice,
    AwaitUnit,
    AwaitQuantity,
    AwaitNote,
    AwaitConfirmation(ConfirmationPhase),
    #[default]
    Terminated
}

/// Side effect requested by a step, executed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        purchase: Purchase,
        submitter: Submitter
    }
}

/// Output of a single transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub replies: Vec<Reply>,
    pub effect: Option<Effect>
}

impl Step {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn reply(reply: Reply) -> Self {
        Self { replies: vec![reply], effect: None }
    }

    pub fn effect(effect: Effect) -> Self {
        Self { replies: Vec::new(), effect: Some(effect) }
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty() && self.effect.is_none()
    }
}

/// The purchase entry conversation of a single session.
///
/// Every transition is a pure function of the current state and the event. The
/// append itself is requested through [`Effect::Submit`] and its outcome reported
/// back with [`Dialogue::complete_submission`] or [`Dialogue::fail_submission`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialogue {
    state: DialogueState,
    record: Option<SessionRecord>
}

impl Dialogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DialogueState::Terminated
    }

    /// Applies a single inbound event.
    ///
    /// Entry actions restart the dialogue from any state. A terminated dialogue
    /// ignores everything else. Inputs that no state expects yield an empty step.
    pub fn apply(&mut self, event: &Event, sender: &Submitter) -> Step {
        match event {
            Event::Command(name) if name == START_COMMAND => self.begin(),
            Event::Text(text) if text == NEW_ENTRY_BUTTON => self.begin(),
            _ if self.is_terminated() => {
                debug!("Ignoring input for a terminated dialogue");
                Step::none()
            }
            Event::Command(name) if name == CANCEL_COMMAND => self.cancel(),
            Event::Text(text) if text == CANCEL_BUTTON => self.cancel(),
            Event::Command(name) => {
                debug!("Ignoring unknown command [/{name}]");
                Step::none()
            }
            Event::Text(text) => self.capture(text),
            Event::Button { data, .. } => self.press(data, sender)
        }
    }

    /// The requested row was appended.
    pub fn complete_submission(&mut self) -> Step {
        if self.state != DialogueState::AwaitConfirmation(ConfirmationPhase::Submitting) {
            return Step::none();
        }

        self.state = DialogueState::AwaitConfirmation(ConfirmationPhase::Submitted);

        Step::reply(Reply::edit(SUBMITTED).with_keyboard(prompts::continue_keyboard()))
    }

    /// The requested row could not be appended, which ends the dialogue.
    pub fn fail_submission(&mut self) -> Step {
        if self.state != DialogueState::AwaitConfirmation(ConfirmationPhase::Submitting) {
            return Step::none();
        }

        self.terminate();

        Step::reply(Reply::edit(WRITE_FAILED))
    }

    fn begin(&mut self) -> Step {
        self.record = Some(SessionRecord::new());
        self.state = DialogueState::AwaitDate;

        Step::reply(Reply::send(DATE_PROMPT).with_keyboard(prompts::main_keyboard()))
    }

    fn cancel(&mut self) -> Step {
        self.terminate();

        Step::reply(Reply::send(CANCELLED))
    }

    fn terminate(&mut self) {
        self.record = None;
        self.state = DialogueState::Terminated;
    }

    fn record_mut(&mut self) -> &mut SessionRecord {
        self.record.get_or_insert_with(SessionRecord::new)
    }

    fn advance(&mut self, next: DialogueState, prompt: &str) -> Step {
        self.state = next;

        Step::reply(Reply::send(prompt))
    }

    fn reject(&self, error: ValidationError, message: &str) -> Step {
        debug!("Rejected input in state [{:?}]: {error}", self.state);

        Step::reply(Reply::send(message))
    }

    fn capture(&mut self, text: &str) -> Step {
        let state = self.state;

        match state {
            DialogueState::AwaitDate => match PurchaseDate::from_str(text) {
                Ok(date) => {
                    self.record_mut().date = Some(date);
                    self.advance(DialogueState::AwaitSeller, SELLER_PROMPT)
                }
                Err(error) => self.reject(error, prompts::date_error(error))
            },
            DialogueState::AwaitSeller => match required_text(text) {
                Ok(seller) => {
                    self.record_mut().seller = Some(seller);
                    self.advance(DialogueState::AwaitDescription, DESCRIPTION_PROMPT)
                }
                Err(error) => self.reject(error, BLANK_ERROR)
            },
            DialogueState::AwaitDescription => match required_text(text) {
                Ok(description) => {
                    self.record_mut().description = Some(description);
                    self.advance(DialogueState::AwaitPrice, PRICE_PROMPT)
                }
                Err(error) => self.reject(error, BLANK_ERROR)
            },
            DialogueState::AwaitPrice => match parse_decimal(text) {
                Ok(price) => {
                    self.record_mut().price = Some(price);
                    self.advance(DialogueState::AwaitUnit, UNIT_PROMPT)
                }
                Err(error) => self.reject(error, PRICE_ERROR)
            },
            DialogueState::AwaitUnit => match required_text(text) {
                Ok(unit) => {
                    self.record_mut().unit = Some(unit);
                    self.advance(DialogueState::AwaitQuantity, QUANTITY_PROMPT)
                }
                Err(error) => self.reject(error, BLANK_ERROR)
            },
            DialogueState::AwaitQuantity => match self.parse_quantity(text) {
                Ok(quantity) => {
                    self.record_mut().quantity = Some(quantity);
                    self.advance(DialogueState::AwaitNote, NOTE_PROMPT)
                }
                Err(error) => self.reject(error, prompts::number_error(error, QUANTITY_ERROR))
            },
            DialogueState::AwaitNote => self.capture_note(text),
            DialogueState::AwaitConfirmation(_) | DialogueState::Terminated => {
                debug!("Ignoring free text in state [{state:?}]");
                Step::none()
            }
        }
    }

    /// Quantity must keep `price * quantity` representable, otherwise no total exists.
    fn parse_quantity(&self, text: &str) -> Result<Decimal, ValidationError> {
        let quantity = parse_decimal(text)?;
        let price = self.record.as_ref().and_then(|record| record.price);

        match price {
            Some(price) if round_total(price, quantity).is_none() => Err(ValidationError::TooLarge),
            _ => Ok(quantity)
        }
    }

    fn capture_note(&mut self, text: &str) -> Step {
        let record = self.record_mut();
        record.note = Some(text.trim().to_string());
        record.total = match (record.price, record.quantity) {
            (Some(price), Some(quantity)) => round_total(price, quantity),
            _ => None
        };

        match record.to_purchase() {
            Some(purchase) => {
                self.state = DialogueState::AwaitConfirmation(ConfirmationPhase::Review);
                Step::reply(Reply::send(prompts::summary(&purchase)).with_keyboard(prompts::review_keyboard()))
            }
            None => {
                debug!("Record incomplete after note, ending dialogue");
                self.terminate();
                Step::reply(Reply::send(WRITE_FAILED))
            }
        }
    }

    fn press(&mut self, data: &str, sender: &Submitter) -> Step {
        let DialogueState::AwaitConfirmation(phase) = self.state else {
            debug!("Ignoring button [{data}] in state [{:?}]", self.state);
            return Step::none();
        };

        let Ok(action) = Action::from_str(data) else {
            debug!("Ignoring unknown button [{data}]");
            return Step::none();
        };

        match (phase, action) {
            (ConfirmationPhase::Review, Action::Confirm) => {
                match self.record.as_ref().and_then(SessionRecord::to_purchase) {
                    Some(purchase) => {
                        self.state = DialogueState::AwaitConfirmation(ConfirmationPhase::Submitting);
                        Step::effect(Effect::Submit { purchase, submitter: sender.clone() })
                    }
                    None => {
                        self.terminate();
                        Step::reply(Reply::edit(WRITE_FAILED))
                    }
                }
            }
            (ConfirmationPhase::Review | ConfirmationPhase::Submitted, Action::Cancel) => {
                self.terminate();
                Step::reply(Reply::edit(CANCELLED))
            }
            (ConfirmationPhase::Submitted, Action::Again) => {
                self.record = Some(SessionRecord::new());
                self.state = DialogueState::AwaitDate;
                Step::reply(Reply::edit(NEXT_DATE_PROMPT))
            }
            (ConfirmationPhase::Submitted, Action::Exit) => {
                self.terminate();
                Step::reply(Reply::edit(FINISHED))
            }
            _ => {
                debug!("Ignoring button [{}] in phase [{phase:?}]", action.token());
                Step::none()
            }
        }
    }
}

fn required_text(text: &str) -> Result<String, ValidationError> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Blank);
    }

    Ok(text.to_string())
}
