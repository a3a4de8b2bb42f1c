//! Per-state dialogue transitions
//!
//! `advance` is pure: given the current state, the record as read at the
//! start of the turn and the input, it returns the replies to send, the
//! patch to persist, the documents to upload with it and, for handoff
//! states, the status reported to the sales team. Nothing is sent or
//! written here.
//!
//! Steps that end in another step's prompt (going back, skipping the down
//! payment, evaluating a trade-in) re-enter the target state with
//! [`TurnInput::Resume`] in the same call.

use chrono::Utc;

use zailo_bot_config::StoreProfile;
use zailo_bot_core::{
    ClientRecord, DealType, DialogueState, FinancingDetails, OutboundMessage, PaymentMethod,
    PendingUpload, RecordPatch, TradeInCar, Vehicle,
};
use zailo_bot_text_processing::{
    detect_confirmation, detect_greeting, detect_interest, detect_payment, extract_number,
    is_cpf_format, normalize_text, parse_currency, Confirmation, Interest, PaymentChoice,
};

use crate::catalog::{price_value, render_candidates, render_details, Catalog};
use crate::messages as msg;

const INSTALLMENT_OPTIONS: [u64; 5] = [12, 24, 36, 48, 60];

const BACK_COMMAND: &str = "voltar";

/// Read-only data the transitions depend on
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    pub store: &'a StoreProfile,
    pub catalog: &'a Catalog,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    /// A customer message; `document` is set when attached media was staged
    Text {
        raw: String,
        document: Option<PendingUpload>,
    },
    /// Re-entry into a state: emit its prompt
    Resume,
}

/// Effects of one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub messages: Vec<OutboundMessage>,
    pub patch: RecordPatch,
    pub uploads: Vec<PendingUpload>,
    /// Status line for the sales team; set when the lead is handed off
    pub handoff: Option<&'static str>,
}

impl Transition {
    /// Reply without touching the record
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn to(state: DialogueState) -> Self {
        Self::with_patch(RecordPatch::transition(state))
    }

    pub fn with_patch(patch: RecordPatch) -> Self {
        Self {
            patch,
            ..Default::default()
        }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.messages.push(OutboundMessage::text(text));
        self
    }

    pub fn send(mut self, message: OutboundMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn upload(mut self, upload: PendingUpload) -> Self {
        self.uploads.push(upload);
        self
    }

    pub fn handoff(mut self, status: &'static str) -> Self {
        self.handoff = Some(status);
        self
    }

    /// Append a later step of the same turn
    pub fn then(mut self, later: Transition) -> Self {
        self.messages.extend(later.messages);
        self.patch.merge(later.patch);
        self.uploads.extend(later.uploads);
        self.handoff = later.handoff.or(self.handoff);
        self
    }

    pub fn target_state(&self) -> Option<DialogueState> {
        self.patch.target_state()
    }

    /// Text bodies, in send order
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().filter_map(OutboundMessage::as_text).collect()
    }
}

/// Entry point for a customer message: the back command, then the
/// current state's handler
pub fn handle_turn(
    ctx: FlowContext<'_>,
    record: &ClientRecord,
    raw: &str,
    document: Option<PendingUpload>,
) -> Transition {
    let current = record.bot_data.state;
    if normalize_text(raw) == BACK_COMMAND {
        return go_back(ctx, record);
    }

    let state = if current.is_terminal() {
        tracing::warn!(
            chat_id = %record.chat_id,
            state = %current,
            "Turn started in a handoff state, restarting the dialogue"
        );
        DialogueState::LeadReceived
    } else {
        current
    };

    advance(
        ctx,
        state,
        record,
        TurnInput::Text {
            raw: raw.trim().to_string(),
            document,
        },
    )
}

/// Transition out of `state` for `input`
pub fn advance(
    ctx: FlowContext<'_>,
    state: DialogueState,
    record: &ClientRecord,
    input: TurnInput,
) -> Transition {
    match input {
        TurnInput::Resume => entry_prompt(ctx, state, record),
        TurnInput::Text { raw, document } => on_message(ctx, state, record, &raw, document),
    }
}

fn go_back(ctx: FlowContext<'_>, record: &ClientRecord) -> Transition {
    let current = record.bot_data.state;
    match record.bot_data.previous_state {
        Some(previous) if previous != current => {
            tracing::info!(
                chat_id = %record.chat_id,
                from = %current,
                to = %previous,
                "Returning to previous step"
            );
            // The step being left becomes the undo target, so a second
            // "voltar" returns to it
            let back = Transition::with_patch(
                RecordPatch::transition(previous).with_previous_state(Some(current)),
            )
            .say(msg::GOING_BACK);
            resume(ctx, record, back, previous)
        },
        _ => Transition::stay().say(msg::NOTHING_TO_GO_BACK),
    }
}

/// Chain `first` with the prompt of `state`, as seen after `first` applies
fn resume(
    ctx: FlowContext<'_>,
    record: &ClientRecord,
    first: Transition,
    state: DialogueState,
) -> Transition {
    let mut projected = record.clone();
    first.patch.apply_to(&mut projected, Utc::now());
    let next = advance(ctx, state, &projected, TurnInput::Resume);
    first.then(next)
}

fn on_message(
    ctx: FlowContext<'_>,
    state: DialogueState,
    record: &ClientRecord,
    raw: &str,
    document: Option<PendingUpload>,
) -> Transition {
    use DialogueState::*;

    match state {
        LeadReceived | Visit | Finalized | FinalizedTradeIn => lead_received(ctx, raw),

        AwaitingInterest => {
            if detect_greeting(raw) {
                Transition::stay().say(msg::INTEREST_REMINDER)
            } else if detect_interest(raw) == Interest::ViewList {
                Transition::to(AwaitingCarChoice)
                    .say(msg::FETCHING_STOCK)
                    .say(ctx.catalog.render_list())
                    .say(msg::PICK_A_MODEL)
            } else {
                car_search(ctx, raw)
            }
        },

        AwaitingCarChoice => car_search(ctx, raw),

        AwaitingVehicleConfirmation => match detect_confirmation(raw) {
            Some(Confirmation::Deny) => Transition::with_patch(
                RecordPatch::transition(AwaitingCarChoice).with_temp_car(None),
            )
            .say(msg::SHOW_LIST_AGAIN)
            .say(ctx.catalog.render_list()),
            Some(Confirmation::Confirm) => match &record.bot_data.temp_car {
                Some(car) => Transition::with_patch(
                    RecordPatch::transition(AwaitingPaymentOption)
                        .with_interested_vehicle(car.clone()),
                )
                .say(msg::confirm_choice(&car.name))
                .say(msg::payment_menu()),
                None => {
                    tracing::warn!(chat_id = %record.chat_id, "Confirmation without a vehicle under discussion");
                    Transition::to(AwaitingCarChoice)
                        .say(ctx.catalog.render_list())
                        .say(msg::PICK_A_MODEL)
                },
            },
            None => Transition::stay().say(msg::CONFIRM_NOT_UNDERSTOOD),
        },

        AwaitingPaymentOption => match payment_choice(record, raw) {
            Some(PaymentChoice::Cash) => Transition::with_patch(
                RecordPatch::transition(CashAskName)
                    .with_payment(PaymentMethod::Cash, DealType::Sale),
            )
            .say(msg::cash_ask_name()),
            Some(PaymentChoice::Financing) => Transition::with_patch(
                RecordPatch::transition(FinancingAskDownPayment)
                    .with_payment(PaymentMethod::Financing, DealType::Sale),
            )
            .say(msg::financing_ask_down_payment()),
            Some(PaymentChoice::TradeIn) => Transition::with_patch(
                RecordPatch::transition(TradeInAskModel)
                    .with_payment(PaymentMethod::TradeIn, DealType::TradeIn),
            )
            .say(msg::trade_in_ask_model()),
            Some(PaymentChoice::Visit) => Transition::to(Visit)
                .say(msg::VISIT_HANDOFF)
                .handoff(msg::STATUS_VISIT),
            None => Transition::stay().say(msg::PAYMENT_NOT_UNDERSTOOD),
        },

        CashAskName => match captured(raw) {
            Some(name) => Transition::with_patch(RecordPatch::transition(Finalized).with_name(name))
                .say(msg::cash_done(name))
                .handoff(msg::STATUS_CASH),
            None => Transition::stay().say(msg::cash_ask_name()),
        },

        FinancingAskDownPayment => match detect_confirmation(raw) {
            Some(Confirmation::Confirm) => {
                Transition::to(FinancingAskDownPaymentValue).say(msg::ask_down_payment_value())
            },
            Some(Confirmation::Deny) => {
                let price = vehicle_price(record);
                let skip = Transition::with_patch(
                    RecordPatch::transition(FinancingConfirmDocuments).with_financing(
                        FinancingDetails {
                            down_payment: Some(0.0),
                            amount_to_finance: Some(price),
                            installments: None,
                        },
                    ),
                )
                .say(msg::NO_DOWN_PAYMENT);
                resume(ctx, record, skip, FinancingConfirmDocuments)
            },
            None => Transition::stay().say(msg::DOWN_PAYMENT_NOT_UNDERSTOOD),
        },

        FinancingAskDownPaymentValue => {
            let down_payment = parse_currency(raw);
            let price = vehicle_price(record);
            if down_payment > 0.0 && down_payment < price {
                let to_finance = price - down_payment;
                Transition::with_patch(
                    RecordPatch::transition(FinancingConfirmDocuments).with_financing(
                        FinancingDetails {
                            down_payment: Some(down_payment),
                            amount_to_finance: Some(to_finance),
                            installments: None,
                        },
                    ),
                )
                .say(msg::down_payment_summary(down_payment, to_finance))
            } else {
                Transition::stay().say(msg::invalid_down_payment())
            }
        },

        FinancingConfirmDocuments => match detect_confirmation(raw) {
            Some(Confirmation::Confirm) => Transition::to(FinancingAskInstallments)
                .say(msg::DOCUMENTS_CHECKLIST)
                .say(msg::ask_installments()),
            Some(Confirmation::Deny) => {
                Transition::to(AwaitingPaymentOption).say(msg::DOCUMENTS_LATER)
            },
            None => Transition::stay().say(msg::DOCUMENTS_NOT_UNDERSTOOD),
        },

        FinancingAskInstallments => match extract_number(raw) {
            Some(n) if INSTALLMENT_OPTIONS.contains(&n) => {
                let details = FinancingDetails {
                    installments: Some(format!("{}x", n)),
                    ..record.bot_data.financing_details.clone()
                };
                Transition::with_patch(
                    RecordPatch::transition(FinancingAskName).with_financing(details),
                )
                .say(msg::installments_chosen(n))
            },
            _ => Transition::stay().say(msg::invalid_installments()),
        },

        FinancingAskName => match captured(raw) {
            Some(name) => {
                Transition::with_patch(RecordPatch::transition(FinancingAskJob).with_name(name))
                    .say(msg::ask_job())
            },
            None => Transition::stay().say(msg::financing_ask_name()),
        },

        FinancingAskJob => match captured(raw) {
            Some(job) => {
                Transition::with_patch(RecordPatch::transition(FinancingAskCpf).with_job(job))
                    .say(msg::ask_cpf())
            },
            None => Transition::stay().say(msg::ask_job()),
        },

        FinancingAskCpf => {
            if is_cpf_format(raw) {
                Transition::with_patch(RecordPatch::transition(FinancingAskRg).with_cpf(raw.trim()))
                    .say(msg::ask_rg())
            } else {
                Transition::stay().say(msg::INVALID_CPF)
            }
        },

        FinancingAskRg => match captured(raw) {
            Some(rg) => Transition::with_patch(
                RecordPatch::transition(FinancingAskIncomeProof).with_rg_number(rg),
            )
            .say(msg::ask_income_proof()),
            None => Transition::stay().say(msg::resume_rg()),
        },

        FinancingAskIncomeProof => match document {
            Some(upload) => Transition::to(FinancingAskRgPhoto)
                .upload(upload)
                .say(msg::ask_rg_photo()),
            None => Transition::stay().say(msg::INCOME_PROOF_MISSING),
        },

        FinancingAskRgPhoto => match document {
            Some(upload) => Transition::to(Finalized)
                .upload(upload)
                .say(msg::FINANCING_DONE)
                .handoff(msg::STATUS_FINANCING),
            None => Transition::stay().say(msg::RG_PHOTO_MISSING),
        },

        TradeInAskModel => match captured(raw) {
            Some(model) => {
                let trade_in = TradeInCar {
                    model: Some(model.to_string()),
                    ..record.bot_data.trade_in_car.clone()
                };
                Transition::with_patch(
                    RecordPatch::transition(TradeInAskPhotos).with_trade_in(trade_in),
                )
                .say(msg::ask_photos())
            },
            None => Transition::stay().say(msg::trade_in_ask_model()),
        },

        TradeInAskPhotos => match document {
            Some(upload) => Transition::to(TradeInConfirmMorePhotos)
                .upload(upload)
                .say(msg::photo_received()),
            None => Transition::stay().say(msg::photos_missing()),
        },

        TradeInConfirmMorePhotos => match detect_confirmation(raw) {
            Some(Confirmation::Confirm) => Transition::to(TradeInAskPhotos).say(msg::NEXT_PHOTO),
            Some(Confirmation::Deny) => {
                Transition::to(TradeInAskValue).say(msg::ask_trade_in_value())
            },
            None => Transition::stay().say(msg::MORE_PHOTOS_NOT_UNDERSTOOD),
        },

        TradeInAskValue => {
            let desired = parse_currency(raw);
            if desired > 0.0 {
                let trade_in = TradeInCar {
                    desired_value: Some(desired),
                    ..record.bot_data.trade_in_car.clone()
                };
                let valued = Transition::with_patch(
                    RecordPatch::transition(TradeInEvaluateDifference).with_trade_in(trade_in),
                );
                resume(ctx, record, valued, TradeInEvaluateDifference)
            } else {
                Transition::stay().say(msg::invalid_trade_in_value())
            }
        },

        TradeInEvaluateDifference => evaluate_difference(record),

        TradeInAskDifferencePayment => {
            let (method, reply) = match detect_payment(raw) {
                Some(PaymentChoice::Cash) => (PaymentMethod::Cash, msg::difference_cash()),
                Some(PaymentChoice::Financing) => {
                    (PaymentMethod::Financing, msg::difference_financing())
                },
                _ => return Transition::stay().say(msg::DIFFERENCE_NOT_UNDERSTOOD),
            };
            let trade_in = TradeInCar {
                difference_payment_method: Some(method),
                ..record.bot_data.trade_in_car.clone()
            };
            Transition::with_patch(
                RecordPatch::transition(TradeInAskFinalName).with_trade_in(trade_in),
            )
            .say(reply)
        },

        TradeInAskFinalName => match captured(raw) {
            Some(name) => {
                Transition::with_patch(RecordPatch::transition(FinalizedTradeIn).with_name(name))
                    .say(msg::trade_in_done(name))
                    .handoff(msg::STATUS_TRADE_IN)
            },
            None => Transition::stay().say(msg::ask_final_name()),
        },
    }
}

fn lead_received(ctx: FlowContext<'_>, raw: &str) -> Transition {
    let store = ctx.store;
    if detect_interest(raw) == Interest::ViewList {
        return Transition::to(DialogueState::AwaitingCarChoice)
            .say(msg::intro(&store.assistant_name, &store.store_name))
            .say(msg::FETCHING_STOCK)
            .say(ctx.catalog.render_list())
            .say(msg::PICK_A_MODEL);
    }

    if !detect_greeting(raw) && !ctx.catalog.find_by_name(raw).is_empty() {
        return Transition::stay()
            .say(msg::intro_car_interest(&store.assistant_name))
            .then(car_search(ctx, raw));
    }

    Transition::to(DialogueState::AwaitingInterest)
        .say(msg::intro_full(&store.assistant_name, &store.store_name))
        .say(msg::ASK_PREFERENCE)
}

fn car_search(ctx: FlowContext<'_>, raw: &str) -> Transition {
    let matches = ctx.catalog.find_by_name(raw);
    match matches.as_slice() {
        [car] => {
            tracing::debug!(vehicle = %car.name, "Vehicle matched");
            Transition::with_patch(
                RecordPatch::transition(DialogueState::AwaitingVehicleConfirmation)
                    .with_temp_car(Some((*car).clone())),
            )
            .say(msg::great_choice(&car.name))
            .then(vehicle_card(car))
        },
        [] => Transition::to(DialogueState::AwaitingCarChoice)
            .say(msg::NO_MATCH)
            .say(ctx.catalog.render_list()),
        several => Transition::to(DialogueState::AwaitingCarChoice)
            .say(msg::SEVERAL_MATCHES)
            .say(render_candidates(several)),
    }
}

/// Photos, detail card and the purchase question
fn vehicle_card(car: &Vehicle) -> Transition {
    let mut card = Transition::stay();
    for image in &car.images {
        card = card.send(OutboundMessage::media(image.clone(), None));
    }
    card.say(render_details(car)).say(msg::ASK_PROCEED)
}

fn evaluate_difference(record: &ClientRecord) -> Transition {
    let desired = record.bot_data.trade_in_car.desired_value.unwrap_or(0.0);
    let difference = vehicle_price(record) - desired;
    if difference > 0.0 {
        Transition::to(DialogueState::TradeInAskDifferencePayment)
            .say(msg::difference_quote(difference))
            .say(msg::ask_difference_payment())
    } else {
        Transition::to(DialogueState::TradeInAskFinalName).say(msg::trade_in_under_review())
    }
}

/// Prompt for a state entered without new input
fn entry_prompt(ctx: FlowContext<'_>, state: DialogueState, record: &ClientRecord) -> Transition {
    use DialogueState::*;

    let store = ctx.store;
    let prompt = Transition::stay();
    match state {
        LeadReceived => prompt
            .say(msg::intro_full(&store.assistant_name, &store.store_name))
            .say(msg::ASK_PREFERENCE),
        AwaitingInterest => prompt.say(msg::INTEREST_REMINDER),
        AwaitingCarChoice => prompt
            .say(ctx.catalog.render_list())
            .say(msg::PICK_A_MODEL),
        AwaitingVehicleConfirmation => match &record.bot_data.temp_car {
            Some(car) => prompt.then(vehicle_card(car)),
            None => prompt
                .say(ctx.catalog.render_list())
                .say(msg::PICK_A_MODEL),
        },
        AwaitingPaymentOption => prompt.say(msg::payment_menu()),
        CashAskName => prompt.say(msg::cash_ask_name()),
        FinancingAskDownPayment => prompt.say(msg::financing_ask_down_payment()),
        FinancingAskDownPaymentValue => prompt.say(msg::ask_down_payment_value()),
        FinancingConfirmDocuments => prompt.say(msg::DOCUMENTS_CHECKLIST),
        FinancingAskInstallments => prompt.say(msg::ask_installments()),
        FinancingAskName => prompt.say(msg::financing_ask_name()),
        FinancingAskJob => prompt.say(msg::ask_job()),
        FinancingAskCpf => prompt.say(msg::resume_cpf()),
        FinancingAskRg => prompt.say(msg::resume_rg()),
        FinancingAskIncomeProof => prompt.say(msg::resume_income_proof()),
        FinancingAskRgPhoto => prompt.say(msg::resume_rg_photo()),
        TradeInAskModel => prompt.say(msg::trade_in_ask_model()),
        TradeInAskPhotos => prompt.say(msg::ask_photos()),
        TradeInConfirmMorePhotos => prompt.say(msg::resume_more_photos()),
        TradeInAskValue => prompt.say(msg::resume_trade_in_value()),
        TradeInEvaluateDifference => evaluate_difference(record),
        TradeInAskDifferencePayment => prompt.say(msg::ask_difference_payment()),
        TradeInAskFinalName => prompt.say(msg::ask_final_name()),
        Visit | Finalized | FinalizedTradeIn => prompt,
    }
}

fn payment_choice(record: &ClientRecord, raw: &str) -> Option<PaymentChoice> {
    let choice = detect_payment(raw);
    if let Some(choice) = choice {
        tracing::debug!(chat_id = %record.chat_id, choice = choice.as_str(), "Payment option chosen");
    }
    choice
}

/// Free-text capture; blank input is not an answer
fn captured(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn vehicle_price(record: &ClientRecord) -> f64 {
    record
        .bot_data
        .temp_car
        .as_ref()
        .map(price_value)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zailo_bot_config::SalesContact;
    use zailo_bot_core::{DocumentField, Price};

    fn store() -> StoreProfile {
        StoreProfile {
            assistant_name: "Zailo".to_string(),
            store_name: "ZailonSoft Veículos".to_string(),
            sales_contacts: vec![SalesContact {
                name: Some("Carlos".to_string()),
                whatsapp: Some("5511999990000".to_string()),
            }],
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Vehicle::new("Chevrolet Onix LT 1.0")
                .with_year("2022")
                .with_price(Price::Text("50.000,00".into()))
                .with_description("Completo"),
            Vehicle::new("Fiat Uno Way 1.0").with_price(Price::Text("35.000,00".into())),
        ])
    }

    fn record_in(state: DialogueState) -> ClientRecord {
        let mut record = ClientRecord::seed("5511@c.us", Some("Ana"), "5511");
        record.bot_data.state = state;
        record.bot_data.temp_car = catalog().vehicles().first().cloned();
        record
    }

    fn run(state: DialogueState, input: &str) -> Transition {
        let (store, catalog) = (store(), catalog());
        let ctx = FlowContext {
            store: &store,
            catalog: &catalog,
        };
        handle_turn(ctx, &record_in(state), input, None)
    }

    #[test]
    fn test_greeting_on_fresh_chat() {
        let t = run(DialogueState::LeadReceived, "oi");
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingInterest));
        let texts = t.texts();
        assert!(texts[0].contains("Zailo"));
        assert!(texts[0].contains("ZailonSoft Veículos"));
        assert_eq!(texts[1], msg::ASK_PREFERENCE);
    }

    #[test]
    fn test_car_name_on_fresh_chat_goes_to_details() {
        let t = run(DialogueState::LeadReceived, "uno way");
        assert_eq!(
            t.target_state(),
            Some(DialogueState::AwaitingVehicleConfirmation)
        );
        assert_eq!(
            t.patch.bot_data.temp_car.as_ref().and_then(|c| c.as_ref()).map(|c| c.name.as_str()),
            Some("Fiat Uno Way 1.0")
        );
        assert!(t.texts()[0].contains("Notei seu interesse"));
        assert_eq!(t.texts().last().copied(), Some(msg::ASK_PROCEED));
    }

    #[test]
    fn test_unknown_text_on_fresh_chat_greets() {
        let t = run(DialogueState::LeadReceived, "ferrari");
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingInterest));
    }

    #[test]
    fn test_confirm_appends_vehicle_once() {
        let t = run(DialogueState::AwaitingVehicleConfirmation, "sim, quero esse");
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingPaymentOption));
        assert_eq!(
            t.patch
                .bot_data
                .append_interested_vehicle
                .as_ref()
                .map(|c| c.name.as_str()),
            Some("Chevrolet Onix LT 1.0")
        );
        assert!(t.texts()[1].contains("*4* - Gostaria de agendar uma visita"));
    }

    #[test]
    fn test_deny_takes_precedence() {
        let t = run(DialogueState::AwaitingVehicleConfirmation, "não, mas confirmo");
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingCarChoice));
        assert_eq!(t.patch.bot_data.temp_car, Some(None));
    }

    #[test]
    fn test_financing_choice() {
        let t = run(DialogueState::AwaitingPaymentOption, "2");
        assert_eq!(t.target_state(), Some(DialogueState::FinancingAskDownPayment));
        assert_eq!(t.patch.bot_data.payment_method, Some(PaymentMethod::Financing));
        assert_eq!(t.patch.bot_data.deal_type, Some(DealType::Sale));
    }

    #[test]
    fn test_visit_hands_off() {
        let t = run(DialogueState::AwaitingPaymentOption, "quero agendar");
        assert_eq!(t.target_state(), Some(DialogueState::Visit));
        assert_eq!(t.handoff, Some(msg::STATUS_VISIT));
    }

    #[test]
    fn test_no_down_payment_skips_to_documents() {
        let t = run(DialogueState::FinancingAskDownPayment, "não");
        assert_eq!(
            t.target_state(),
            Some(DialogueState::FinancingConfirmDocuments)
        );
        let details = t.patch.bot_data.financing_details.clone().unwrap();
        assert_eq!(details.down_payment, Some(0.0));
        assert_eq!(details.amount_to_finance, Some(50000.0));
        assert_eq!(t.texts(), vec![msg::NO_DOWN_PAYMENT, msg::DOCUMENTS_CHECKLIST]);
    }

    #[test]
    fn test_down_payment_must_be_below_price() {
        let t = run(DialogueState::FinancingAskDownPaymentValue, "60000");
        assert!(t.patch.is_empty());

        let t = run(DialogueState::FinancingAskDownPaymentValue, "R$ 10.000,00");
        let details = t.patch.bot_data.financing_details.clone().unwrap();
        assert_eq!(details.amount_to_finance, Some(40000.0));
        assert!(t.texts()[0].contains("*R$ 40.000,00*"));
    }

    #[test]
    fn test_invalid_installments_stay() {
        let t = run(DialogueState::FinancingAskInstallments, "45");
        assert!(t.patch.is_empty());
        assert!(t.texts()[0].contains("12, 24, 36, 48 ou 60"));
    }

    #[test]
    fn test_valid_installments_stored_with_suffix() {
        let t = run(DialogueState::FinancingAskInstallments, "quero em 36 vezes");
        assert_eq!(t.target_state(), Some(DialogueState::FinancingAskName));
        assert_eq!(
            t.patch.bot_data.financing_details.unwrap().installments.as_deref(),
            Some("36x")
        );
    }

    #[test]
    fn test_cpf_validation() {
        let t = run(DialogueState::FinancingAskCpf, "123.456.789-01");
        assert_eq!(t.texts(), vec![msg::INVALID_CPF]);

        let t = run(DialogueState::FinancingAskCpf, "12345678901");
        assert_eq!(t.patch.cpf.as_deref(), Some("12345678901"));
        assert_eq!(t.target_state(), Some(DialogueState::FinancingAskRg));
    }

    #[test]
    fn test_trade_in_difference_quoted() {
        let t = run(DialogueState::TradeInAskValue, "40000");
        assert_eq!(
            t.target_state(),
            Some(DialogueState::TradeInAskDifferencePayment)
        );
        assert_eq!(
            t.patch.bot_data.trade_in_car.clone().unwrap().desired_value,
            Some(40000.0)
        );
        assert!(t.texts()[0].contains("R$ 10.000,00"));
    }

    #[test]
    fn test_trade_in_worth_more_asks_name() {
        let t = run(DialogueState::TradeInAskValue, "55000");
        assert_eq!(t.target_state(), Some(DialogueState::TradeInAskFinalName));
    }

    #[test]
    fn test_trade_in_invalid_value() {
        let t = run(DialogueState::TradeInAskValue, "não sei");
        assert!(t.patch.is_empty());
    }

    #[test]
    fn test_document_state_requires_media() {
        let t = run(DialogueState::FinancingAskRgPhoto, "");
        assert_eq!(t.texts(), vec![msg::RG_PHOTO_MISSING]);
        assert!(t.uploads.is_empty());

        let (store, catalog) = (store(), catalog());
        let ctx = FlowContext {
            store: &store,
            catalog: &catalog,
        };
        let upload = PendingUpload::new(DocumentField::RgPhoto, "/tmp/rg.jpeg", "image/jpeg");
        let t = handle_turn(
            ctx,
            &record_in(DialogueState::FinancingAskRgPhoto),
            "",
            Some(upload.clone()),
        );
        assert_eq!(t.target_state(), Some(DialogueState::Finalized));
        assert_eq!(t.uploads, vec![upload]);
        assert_eq!(t.handoff, Some(msg::STATUS_FINANCING));
    }

    #[test]
    fn test_back_restores_and_prompts() {
        let (store, catalog) = (store(), catalog());
        let ctx = FlowContext {
            store: &store,
            catalog: &catalog,
        };
        let mut record = record_in(DialogueState::FinancingAskDownPayment);
        record.bot_data.previous_state = Some(DialogueState::AwaitingPaymentOption);

        let t = handle_turn(ctx, &record, "Voltar!", None);
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingPaymentOption));
        assert_eq!(
            t.patch.bot_data.previous_state,
            Some(Some(DialogueState::FinancingAskDownPayment))
        );
        assert_eq!(t.texts()[0], msg::GOING_BACK);
        assert_eq!(t.texts()[1], msg::payment_menu());
    }

    #[test]
    fn test_back_without_previous() {
        let t = run(DialogueState::FinancingAskJob, "voltar");
        assert!(t.patch.is_empty());
        assert_eq!(t.texts(), vec![msg::NOTHING_TO_GO_BACK]);
    }

    #[test]
    fn test_terminal_state_restarts() {
        let t = run(DialogueState::Finalized, "oi");
        assert_eq!(t.target_state(), Some(DialogueState::AwaitingInterest));
    }
}
