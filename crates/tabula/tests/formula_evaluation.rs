//! Tests for formula evaluation with cell references

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::{evaluate, evaluate_formula, parse_formula, EmptySource, ParseError};

/// Test basic formula evaluation without cell references
#[test]
fn test_evaluate_simple_formulas() {
    let ctx = EvaluationContext::new(&EmptySource);

    // Arithmetic
    let ast = parse_formula("=1+2*3").unwrap();
    assert_eq!(evaluate(&ast, &ctx), CellValue::Number(7.0));

    // String concatenation
    let ast = parse_formula("=\"Hello \"&\"World\"").unwrap();
    assert_eq!(evaluate(&ast, &ctx), CellValue::text("Hello World"));

    // Comparison
    let ast = parse_formula("=5>3").unwrap();
    assert_eq!(evaluate(&ast, &ctx), CellValue::Logical(true));
}

/// Test IF function
#[test]
fn test_evaluate_if() {
    assert_eq!(
        evaluate_formula("=IF(1>0,\"Yes\",\"No\")", &EmptySource).unwrap(),
        CellValue::text("Yes")
    );
    assert_eq!(
        evaluate_formula("=IF(1<0,\"Yes\",\"No\")", &EmptySource).unwrap(),
        CellValue::text("No")
    );
}

/// Test formula evaluation with cell references
#[test]
fn test_evaluate_with_cell_references() {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 10.0).unwrap();
    sheet.set_cell_value("A2", 20.0).unwrap();
    sheet.set_cell_value("B1", "label").unwrap();

    assert_eq!(workbook.calculate("=A1+A2").unwrap(), CellValue::Number(30.0));
    assert_eq!(workbook.calculate("=$A$1*A2").unwrap(), CellValue::Number(200.0));
    assert_eq!(
        workbook.calculate("=B1&\": \"&A1").unwrap(),
        CellValue::text("label: 10")
    );
    assert_eq!(
        workbook.calculate("=B1+1").unwrap(),
        CellValue::Error(ErrorKind::Value)
    );
}

/// Test cross-sheet references
#[test]
fn test_evaluate_cross_sheet_references() {
    let mut workbook = Workbook::new();
    let index = workbook.add_worksheet_with_name("Q1 Data").unwrap();
    workbook
        .worksheet_mut(index)
        .unwrap()
        .set_cell_value("C3", 5.0)
        .unwrap();

    assert_eq!(
        workbook.calculate("='Q1 Data'!C3*2").unwrap(),
        CellValue::Number(10.0)
    );
    assert_eq!(
        workbook.calculate("='q1 data'!C3").unwrap(),
        CellValue::Number(5.0)
    );
    assert_eq!(
        workbook.calculate("=Nowhere!A1").unwrap(),
        CellValue::Error(ErrorKind::Reference)
    );
    assert_eq!(
        workbook.calculate("=ISREF(Nowhere!A1)").unwrap(),
        CellValue::Logical(true)
    );
}

/// Unqualified references follow the active sheet
#[test]
fn test_active_sheet() {
    let mut workbook = Workbook::new();
    let second = workbook.add_worksheet().unwrap();
    workbook
        .worksheet_mut(second)
        .unwrap()
        .set_cell_value("A1", "second")
        .unwrap();

    assert_eq!(
        workbook.calculate("=ISBLANK(A1)").unwrap(),
        CellValue::Logical(true)
    );
    workbook.set_active_sheet(second).unwrap();
    assert_eq!(workbook.calculate("=A1").unwrap(), CellValue::text("second"));
}

/// Test defined names
#[test]
fn test_defined_names() {
    let mut workbook = Workbook::new();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .set_cell_value("D4", 0.2)
        .unwrap();
    workbook
        .define_name("TaxRate", Locator::cell(CellAddress::new(3, 3)))
        .unwrap();

    assert_eq!(workbook.calculate("=100*taxrate").unwrap(), CellValue::Number(20.0));
    assert_eq!(
        workbook.calculate("=ISREF(TaxRate)").unwrap(),
        CellValue::Logical(true)
    );
    assert_eq!(
        workbook.calculate("=Undefined").unwrap(),
        CellValue::Error(ErrorKind::Name)
    );
}

/// Errors inside formulas are values, not failures
#[test]
fn test_errors_are_values() {
    let workbook = Workbook::new();
    assert_eq!(
        workbook.calculate("=1/0").unwrap(),
        CellValue::Error(ErrorKind::DivisionByZero)
    );
    assert_eq!(
        workbook.calculate("=IFERROR(1/0,0)").unwrap(),
        CellValue::Number(0.0)
    );
    assert_eq!(
        workbook.calculate("=UNKNOWN.FUNC(1)").unwrap(),
        CellValue::Error(ErrorKind::Name)
    );
}

/// Malformed formula text is a parse failure
#[test]
fn test_malformed_formulas() {
    let workbook = Workbook::new();
    assert!(matches!(
        workbook.calculate("="),
        Err(FormulaError::Parse(ParseError::EmptyFormula))
    ));
    assert!(matches!(
        workbook.calculate("=(1+2"),
        Err(FormulaError::Parse(ParseError::UnmatchedParenthesis { .. }))
    ));
    assert!(matches!(
        workbook.calculate("=\"open"),
        Err(FormulaError::Lex(_))
    ));
}

/// A parsed formula can be evaluated again after the data changes
#[test]
fn test_reevaluation() {
    let ast = parse_formula("=ISNUMBER(A1)").unwrap();
    let mut workbook = Workbook::new();

    assert_eq!(
        evaluate(&ast, &EvaluationContext::new(&workbook)),
        CellValue::Logical(false)
    );

    workbook
        .worksheet_mut(0)
        .unwrap()
        .set_cell_input("A1", "42")
        .unwrap();
    assert_eq!(
        evaluate(&ast, &EvaluationContext::new(&workbook)),
        CellValue::Logical(true)
    );
}

/// Printing a parsed formula gives text that parses to the same tree
#[test]
fn test_print_round_trip() {
    for formula in [
        "=IF(ISBLANK(A1),\"\",A1*2)",
        "=-(1+2)^2%",
        "='My Sheet'!$A$1:B2",
        "=ERROR.TYPE(#N/A)&\"x\"\"y\"",
    ] {
        let ast = parse_formula(formula).unwrap();
        let printed = ast.to_string();
        assert_eq!(parse_formula(&printed).unwrap(), ast, "{}", printed);
    }
}

/// Deep nesting evaluates inside the default limit and is refused beyond it
#[test]
fn test_deep_nesting() {
    let workbook = Workbook::new();
    let nested = format!("={}1{}", "N(".repeat(100), ")".repeat(100));
    assert_eq!(workbook.calculate(&nested).unwrap(), CellValue::Number(1.0));

    let nested_if = format!("={}1{}", "IF(TRUE,".repeat(100), ")".repeat(100));
    assert_eq!(workbook.calculate(&nested_if).unwrap(), CellValue::Number(1.0));

    let too_deep = format!("={}1{}", "(".repeat(600), ")".repeat(600));
    assert!(matches!(
        workbook.calculate(&too_deep),
        Err(FormulaError::Parse(ParseError::NestingTooDeep { .. }))
    ));
}
