//! Built-in scenarios and answer keys that guarantee the trainer
//! is useful even without an external scenario bank.

use crate::domain::{
  AnswerKey, DischargeDestination, Expectation, ExpectedField, FieldId, OrificeLetter, RelievingCase, Scenario,
  ServiceType, ValveStyle,
};

fn approx(field: FieldId, value: f64) -> ExpectedField {
  ExpectedField { field, expect: Expectation::Approx { value } }
}

fn range(field: FieldId, min: f64, max: f64) -> ExpectedField {
  ExpectedField { field, expect: Expectation::Range { min, max } }
}

fn routed(value: DischargeDestination) -> ExpectedField {
  ExpectedField { field: FieldId::DischargeDestination, expect: Expectation::Destination { value } }
}

pub fn seed_scenarios() -> Vec<(Scenario, AnswerKey)> {
  vec![
    (
      Scenario {
        id: "separator-fire".into(),
        title: "Pool fire under a gas-filled separator".into(),
        service: ServiceType::Gas,
        discharge: DischargeDestination::Flare,
        plausible_cases: vec![
          RelievingCase::FireCase,
          RelievingCase::BlockedOutlet,
          RelievingCase::ControlValveFailure,
        ],
        hard_eligible: true,
        required_inputs: vec![],
        constraints: vec![
          "Vessel is uninsulated and sits within 25 ft of grade.".into(),
          "Relief discharges to a flare header with variable superimposed backpressure.".into(),
        ],
      },
      AnswerKey {
        scenario_id: "separator-fire".into(),
        relieving_case: RelievingCase::FireCase,
        valve_style: ValveStyle::Bellows,
        orifice_letter: OrificeLetter::J,
        expected: vec![
          approx(FieldId::SetPressure, 150.0),
          approx(FieldId::RequiredFlow, 21500.0),
          approx(FieldId::MolecularWeight, 28.0),
          range(FieldId::CompressibilityFactor, 0.9, 1.0),
          approx(FieldId::SpecificHeatRatio, 1.27),
          routed(DischargeDestination::Flare),
          range(FieldId::SuperimposedBackpressure, 0.0, 20.0),
        ],
      },
    ),
    (
      Scenario {
        id: "pump-blocked-discharge".into(),
        title: "Centrifugal pump against a closed discharge valve".into(),
        service: ServiceType::Liquid,
        discharge: DischargeDestination::ClosedHeader,
        plausible_cases: vec![RelievingCase::BlockedOutlet, RelievingCase::ThermalExpansion],
        hard_eligible: false,
        required_inputs: vec![],
        constraints: vec!["Relief returns to the suction drum through a closed header.".into()],
      },
      AnswerKey {
        scenario_id: "pump-blocked-discharge".into(),
        relieving_case: RelievingCase::BlockedOutlet,
        valve_style: ValveStyle::Bellows,
        orifice_letter: OrificeLetter::F,
        expected: vec![
          approx(FieldId::SetPressure, 275.0),
          approx(FieldId::RequiredFlow, 320.0),
          approx(FieldId::LiquidDensity, 850.0),
          range(FieldId::Viscosity, 1.5, 3.5),
          routed(DischargeDestination::ClosedHeader),
        ],
      },
    ),
    (
      Scenario {
        id: "boiler-drum".into(),
        title: "Steam drum with a failed feedwater trip".into(),
        service: ServiceType::Steam,
        discharge: DischargeDestination::Atmosphere,
        plausible_cases: vec![
          RelievingCase::BlockedOutlet,
          RelievingCase::FireCase,
          RelievingCase::PowerFailure,
        ],
        hard_eligible: true,
        required_inputs: vec![FieldId::Notes],
        constraints: vec!["Saturated steam vented to atmosphere above the roof line.".into()],
      },
      AnswerKey {
        scenario_id: "boiler-drum".into(),
        relieving_case: RelievingCase::BlockedOutlet,
        valve_style: ValveStyle::Conventional,
        orifice_letter: OrificeLetter::P,
        expected: vec![
          approx(FieldId::SetPressure, 600.0),
          approx(FieldId::RelievingTemperature, 495.0),
          approx(FieldId::RequiredFlow, 60000.0),
          routed(DischargeDestination::Atmosphere),
        ],
      },
    ),
    (
      Scenario {
        id: "reactor-cooling-loss".into(),
        title: "Exothermic reactor after loss of cooling water".into(),
        service: ServiceType::TwoPhase,
        discharge: DischargeDestination::Flare,
        plausible_cases: vec![
          RelievingCase::CoolingWaterFailure,
          RelievingCase::PowerFailure,
          RelievingCase::FireCase,
        ],
        hard_eligible: true,
        required_inputs: vec![],
        constraints: vec![
          "Reactor contents flash on relief; assume homogeneous two-phase flow.".into(),
          "Flare header built-up backpressure can reach 30% of set.".into(),
        ],
      },
      AnswerKey {
        scenario_id: "reactor-cooling-loss".into(),
        relieving_case: RelievingCase::CoolingWaterFailure,
        valve_style: ValveStyle::PilotOperated,
        orifice_letter: OrificeLetter::L,
        expected: vec![
          approx(FieldId::SetPressure, 100.0),
          approx(FieldId::MolecularWeight, 58.0),
          approx(FieldId::LiquidDensity, 620.0),
          range(FieldId::VaporFraction, 0.2, 0.4),
          routed(DischargeDestination::Flare),
          range(FieldId::BuiltUpBackpressure, 20.0, 30.0),
        ],
      },
    ),
  ]
}
