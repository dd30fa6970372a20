//! HTML rendering for the single page
//!
//! Only parsed numbers, fixed choices and fixed messages are written into the
//! markup, so submitted text never reaches the page verbatim.

use crate::bmi::{Bmi, BmiError, BmiForm};
use crate::features::{Region, Sex, Smoker};
use crate::form::{PredictionForm, MAX_AGE, MIN_AGE};
use crate::predictor::Prediction;

pub const DISCLAIMER: &str = "The predicted medical insurance cost shown above is for your own reference. \
     Your actual medical insurance cost may be varied due to certain factors.";

const DEFAULT_AGE: u8 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Success(Prediction),
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub prediction_form: PredictionForm,
    pub prediction: Option<PredictionOutcome>,
    pub bmi_form: BmiForm,
    pub bmi: Option<Result<Bmi, BmiError>>,
}

pub fn render_page(view: &PageView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Medical Insurance Cost Predictor</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; display: flex; background-color: #f5f5f5; }}
        aside {{ width: 320px; padding: 24px; background: #eef1f5; min-height: 100vh; box-sizing: border-box; }}
        main {{ flex: 1; padding: 32px 48px; max-width: 760px; }}
        label {{ display: block; margin-top: 14px; font-weight: bold; }}
        input, select {{ width: 100%; padding: 6px; margin-top: 4px; box-sizing: border-box; }}
        button {{ margin-top: 18px; padding: 8px 20px; }}
        form {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .info {{ background: #e8f1fb; color: #0c4a6e; padding: 12px; border-radius: 6px; margin: 12px 0; }}
        .error {{ background: #fdecea; color: #8a1c1c; padding: 12px; border-radius: 6px; margin: 12px 0; }}
        .success {{ background: #e7f6ec; color: #14532d; padding: 12px; border-radius: 6px; margin: 12px 0; }}
    </style>
</head>
<body>
{sidebar}
<main>
    <h1>Do you wish to predict your health insurance costs using data?</h1>
    <div class="info"><strong>NOTE:</strong> Please kindly fill up all the <strong>required</strong> fields in the form below and click on the 'Predict' button to predict your medical insurance costs.</div>
{form}
</main>
</body>
</html>
"#,
        sidebar = render_sidebar(&view.bmi_form, view.bmi.as_ref()),
        form = render_prediction_form(&view.prediction_form, view.prediction.as_ref()),
    )
}

fn render_sidebar(form: &BmiForm, outcome: Option<&Result<Bmi, BmiError>>) -> String {
    let message = match outcome {
        Some(Ok(bmi)) => format!(r#"<div class="info">{}</div>"#, bmi),
        Some(Err(err)) => format!(r#"<div class="error">{}</div>"#, err),
        None => String::new(),
    };

    format!(
        r#"<aside>
    <h3>What is so unique about this health insurance app?</h3>
    <p>This web app integrated with a <strong>Random Forest Regressor</strong> algorithm to predict your medical insurance costs based on the following attributes:</p>
    <ul>
        <li>age</li>
        <li>sex</li>
        <li>body mass index (BMI)</li>
        <li>number of children in the household</li>
        <li>smoking or not</li>
        <li>the demographic region</li>
    </ul>
    <h3>Body Mass Index (BMI) calculator</h3>
    <form method="post" action="/bmi">
        <label for="weight">Enter your weight in kg (e.g. 45.7 kg):</label>
        <input id="weight" name="weight" type="number" min="0" step="0.01" value="{weight}">
        <label for="height">Enter your height in m (e.g. 1.76 m):</label>
        <input id="height" name="height" type="number" min="0" max="2.50" step="0.01" value="{height}">
        <button type="submit">Calculate</button>
    </form>
    {message}
</aside>"#,
        weight = number_value(&form.weight),
        height = number_value(&form.height),
        message = message,
    )
}

fn render_prediction_form(form: &PredictionForm, outcome: Option<&PredictionOutcome>) -> String {
    let age = form
        .age
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .unwrap_or(DEFAULT_AGE);
    let children = form.children.trim().parse::<u32>().unwrap_or(0);

    let result = match outcome {
        Some(PredictionOutcome::Success(prediction)) => format!(
            r#"    <div class="success"><strong>Result:</strong> {}</div>
    <div class="info"><strong>NOTE:</strong> {}</div>
    <div class="info">Thank you for using our app!</div>"#,
            prediction, DISCLAIMER
        ),
        Some(PredictionOutcome::Invalid(message)) => format!(
            r#"    <div class="error"><strong>NOTE:</strong> {}</div>"#,
            message
        ),
        None => String::new(),
    };

    format!(
        r#"<form method="post" action="/predict">
    <label for="age">How old are you? <output id="age-value">{age}</output></label>
    <input id="age" name="age" type="range" min="{min_age}" max="{max_age}" value="{age}" oninput="document.getElementById('age-value').value = this.value" title="Use the mouse to render over the range slider to match your current age.">
    <label for="sex">What is your gender?</label>
    {sex}
    <label for="bmi">What is your BMI?</label>
    <input id="bmi" name="bmi" type="number" min="0" step="0.01" value="{bmi}" title="BMI is a person's weight in kg divided by the squares of height in m. If you wish to know about your BMI, you may use the calculator on the sidebar.">
    <label for="smoker">Are you a smoker?</label>
    {smoker}
    <label for="region">What is your current demographic location?</label>
    {region}
    <label for="children">What is the total number of children living in the same household?</label>
    <input id="children" name="children" type="number" min="0" step="1" value="{children}">
    <button type="submit">Predict</button>
{result}
</form>"#,
        age = age,
        min_age = MIN_AGE,
        max_age = MAX_AGE,
        sex = render_select("sex", &form.sex, Sex::CHOICES.iter().map(|c| c.as_str())),
        bmi = number_value(&form.bmi),
        smoker = render_select("smoker", &form.smoker, Smoker::CHOICES.iter().map(|c| c.as_str())),
        region = render_select("region", &form.region, Region::CHOICES.iter().map(|c| c.as_str())),
        children = children,
        result = result,
    )
}

/// A select with an empty default followed by the fixed choices
fn render_select<'a>(name: &str, selected: &str, choices: impl Iterator<Item = &'a str>) -> String {
    let mut options = String::from(r#"<option value=""></option>"#);
    for choice in choices {
        let marker = if choice == selected.trim() { " selected" } else { "" };
        options.push_str(&format!(
            r#"<option value="{choice}"{marker}>{choice}</option>"#
        ));
    }
    format!(r#"<select id="{name}" name="{name}">{options}</select>"#)
}

/// Echo a submitted number with two decimals, or `0.00` when it does not parse
fn number_value(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{:.2}", v),
        _ => "0.00".to_string(),
    }
}
