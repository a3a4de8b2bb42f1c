//! Typed record mutations
//!
//! A patch names only the fields a step changes. Applying it is a shallow
//! merge over the current record: untouched fields keep their values.

use chrono::{DateTime, Utc};

use crate::record::{
    ClientRecord, DealType, FinancingDetails, HistoryEntry, PaymentMethod, TradeInCar, Vehicle,
};
use crate::state::DialogueState;

/// Changes to top-level record fields plus `bot_data`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub job: Option<String>,
    pub rg_number: Option<String>,
    pub bot_data: BotDataPatch,
}

/// Changes to `bot_data`
///
/// `Option<Option<_>>` fields distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BotDataPatch {
    pub state: Option<DialogueState>,
    pub previous_state: Option<Option<DialogueState>>,
    pub temp_car: Option<Option<Vehicle>>,
    pub append_interested_vehicle: Option<Vehicle>,
    pub payment_method: Option<PaymentMethod>,
    pub deal_type: Option<DealType>,
    pub financing_details: Option<FinancingDetails>,
    pub trade_in_car: Option<TradeInCar>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that only moves the dialogue to `state`
    pub fn transition(state: DialogueState) -> Self {
        let mut patch = Self::default();
        patch.bot_data.state = Some(state);
        patch
    }

    /// Return to the initial step and forget the current negotiation
    pub fn reset() -> Self {
        Self {
            bot_data: BotDataPatch {
                state: Some(DialogueState::LeadReceived),
                previous_state: Some(None),
                temp_car: Some(None),
                financing_details: Some(FinancingDetails::default()),
                trade_in_car: Some(TradeInCar::default()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cpf(mut self, cpf: impl Into<String>) -> Self {
        self.cpf = Some(cpf.into());
        self
    }

    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    pub fn with_rg_number(mut self, rg: impl Into<String>) -> Self {
        self.rg_number = Some(rg.into());
        self
    }

    pub fn with_previous_state(mut self, previous: Option<DialogueState>) -> Self {
        self.bot_data.previous_state = Some(previous);
        self
    }

    pub fn with_temp_car(mut self, car: Option<Vehicle>) -> Self {
        self.bot_data.temp_car = Some(car);
        self
    }

    pub fn with_interested_vehicle(mut self, car: Vehicle) -> Self {
        self.bot_data.append_interested_vehicle = Some(car);
        self
    }

    pub fn with_payment(mut self, method: PaymentMethod, deal: DealType) -> Self {
        self.bot_data.payment_method = Some(method);
        self.bot_data.deal_type = Some(deal);
        self
    }

    pub fn with_financing(mut self, details: FinancingDetails) -> Self {
        self.bot_data.financing_details = Some(details);
        self
    }

    pub fn with_trade_in(mut self, trade_in: TradeInCar) -> Self {
        self.bot_data.trade_in_car = Some(trade_in);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Target state, if this patch moves the dialogue
    pub fn target_state(&self) -> Option<DialogueState> {
        self.bot_data.state
    }

    /// Fold a later patch of the same turn into this one; later values win
    pub fn merge(&mut self, later: RecordPatch) {
        fn take<T>(slot: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *slot = later;
            }
        }

        take(&mut self.name, later.name);
        take(&mut self.cpf, later.cpf);
        take(&mut self.job, later.job);
        take(&mut self.rg_number, later.rg_number);

        let bd = later.bot_data;
        take(&mut self.bot_data.state, bd.state);
        take(&mut self.bot_data.previous_state, bd.previous_state);
        take(&mut self.bot_data.temp_car, bd.temp_car);
        take(
            &mut self.bot_data.append_interested_vehicle,
            bd.append_interested_vehicle,
        );
        take(&mut self.bot_data.payment_method, bd.payment_method);
        take(&mut self.bot_data.deal_type, bd.deal_type);
        take(&mut self.bot_data.financing_details, bd.financing_details);
        take(&mut self.bot_data.trade_in_car, bd.trade_in_car);
    }

    /// Shallow-merge this patch into `record`.
    ///
    /// When the state changes and the patch does not name `previousState`
    /// itself, the pre-transition state becomes the undo target.
    pub fn apply_to(&self, record: &mut ClientRecord, at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            record.name = Some(name.clone());
        }
        if let Some(cpf) = &self.cpf {
            record.cpf = Some(cpf.clone());
        }
        if let Some(job) = &self.job {
            record.job = Some(job.clone());
        }
        if let Some(rg) = &self.rg_number {
            record.rg_number = Some(rg.clone());
        }

        let patch = &self.bot_data;
        let data = &mut record.bot_data;

        if let Some(car) = &patch.temp_car {
            data.temp_car = car.clone();
        }
        if let Some(car) = &patch.append_interested_vehicle {
            data.interested_vehicles.push(car.clone());
        }
        if let Some(method) = patch.payment_method {
            data.payment_method = Some(method);
        }
        if let Some(deal) = patch.deal_type {
            data.deal_type = Some(deal);
        }
        if let Some(details) = &patch.financing_details {
            data.financing_details = details.clone();
        }
        if let Some(trade_in) = &patch.trade_in_car {
            data.trade_in_car = trade_in.clone();
        }

        if let Some(next) = patch.state {
            let before = data.state;
            if next != before {
                data.previous_state = Some(before);
                data.history.push(HistoryEntry::transition(at, before, next));
            }
            data.state = next;
        }
        if let Some(previous) = patch.previous_state {
            data.previous_state = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Price;

    fn record_in(state: DialogueState) -> ClientRecord {
        let mut record = ClientRecord::seed("1@c.us", Some("Ana"), "1");
        record.bot_data.state = state;
        record
    }

    #[test]
    fn test_state_change_sets_previous() {
        let mut record = record_in(DialogueState::AwaitingInterest);
        RecordPatch::transition(DialogueState::AwaitingCarChoice).apply_to(&mut record, Utc::now());

        assert_eq!(record.bot_data.state, DialogueState::AwaitingCarChoice);
        assert_eq!(
            record.bot_data.previous_state,
            Some(DialogueState::AwaitingInterest)
        );
        assert_eq!(record.bot_data.history.len(), 1);
    }

    #[test]
    fn test_same_state_keeps_previous() {
        let mut record = record_in(DialogueState::AwaitingCarChoice);
        record.bot_data.previous_state = Some(DialogueState::LeadReceived);
        RecordPatch::transition(DialogueState::AwaitingCarChoice).apply_to(&mut record, Utc::now());

        assert_eq!(record.bot_data.previous_state, Some(DialogueState::LeadReceived));
        assert!(record.bot_data.history.is_empty());
    }

    #[test]
    fn test_explicit_previous_wins() {
        let mut record = record_in(DialogueState::AwaitingPaymentOption);
        RecordPatch::transition(DialogueState::AwaitingVehicleConfirmation)
            .with_previous_state(None)
            .apply_to(&mut record, Utc::now());

        assert_eq!(
            record.bot_data.state,
            DialogueState::AwaitingVehicleConfirmation
        );
        assert_eq!(record.bot_data.previous_state, None);
    }

    #[test]
    fn test_untouched_fields_preserved() {
        let mut record = record_in(DialogueState::FinancingAskJob);
        record.cpf = Some("12345678901".to_string());
        record.bot_data.payment_method = Some(PaymentMethod::Financing);

        RecordPatch::transition(DialogueState::FinancingAskCpf)
            .with_job("Engenheira")
            .apply_to(&mut record, Utc::now());

        assert_eq!(record.job.as_deref(), Some("Engenheira"));
        assert_eq!(record.cpf.as_deref(), Some("12345678901"));
        assert_eq!(record.bot_data.payment_method, Some(PaymentMethod::Financing));
    }

    #[test]
    fn test_reset_clears_negotiation() {
        let mut record = record_in(DialogueState::Finalized);
        record.bot_data.previous_state = Some(DialogueState::FinancingAskRgPhoto);
        record.bot_data.temp_car = Some(Vehicle::new("Onix").with_price(Price::Amount(1.0)));
        record.bot_data.financing_details.installments = Some("24x".to_string());
        record.bot_data.trade_in_car.model = Some("Uno 2018".to_string());
        record.bot_data.interested_vehicles.push(Vehicle::new("Onix"));

        RecordPatch::reset().apply_to(&mut record, Utc::now());

        let data = &record.bot_data;
        assert_eq!(data.state, DialogueState::LeadReceived);
        assert_eq!(data.previous_state, None);
        assert!(data.temp_car.is_none());
        assert_eq!(data.financing_details, FinancingDetails::default());
        assert_eq!(data.trade_in_car, TradeInCar::default());
        // Confirmed selections stay in the record
        assert_eq!(data.interested_vehicles.len(), 1);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut first = RecordPatch::transition(DialogueState::TradeInEvaluateDifference)
            .with_trade_in(TradeInCar {
                desired_value: Some(40000.0),
                ..Default::default()
            });
        first.merge(RecordPatch::transition(
            DialogueState::TradeInAskDifferencePayment,
        ));

        assert_eq!(
            first.target_state(),
            Some(DialogueState::TradeInAskDifferencePayment)
        );
        assert_eq!(
            first.bot_data.trade_in_car.unwrap().desired_value,
            Some(40000.0)
        );
    }

    #[test]
    fn test_empty_patch() {
        assert!(RecordPatch::new().is_empty());
        assert!(!RecordPatch::reset().is_empty());
    }
}
