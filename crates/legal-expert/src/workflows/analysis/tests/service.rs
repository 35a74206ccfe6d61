use super::common::*;
use std::sync::Arc;
use std::time::Duration;

use crate::workflows::analysis::{
    AnalysisRepository, AssessmentError, CaseAnalysisError, CaseAnalysisId,
    CaseAnalysisService, CaseSubmission, TimeEstimate, ValidationError,
};
use crate::workflows::directory::LawyerDirectory;
use crate::workflows::domain::{AreaOfLaw, UserId};
use crate::workflows::testing::{lawyer, MemoryAnalyses, MemoryDirectory};

#[tokio::test]
async fn submit_refines_scores_and_suggests_top_rated_lawyers() {
    let (service, assessor, _, analyses) = build_service(CountingAssessmentClient::returning(raw(
        72, 55, 40,
    )));

    let view = service
        .submit(&user(), civil_case())
        .await
        .expect("analysis succeeds");

    assert_eq!(assessor.calls(), 1);
    assert_eq!(view.user, user());
    assert_eq!(view.area_of_law, AreaOfLaw::Civil);
    assert_eq!(view.analysis.risk_level, 68);
    assert_eq!(view.analysis.resolution_probability, 25);
    assert_eq!(view.analysis.complexity, 40);
    assert!(TimeEstimate::ALL.contains(&view.analysis.time_estimate));

    let suggested: Vec<&str> = view
        .suggested_lawyers
        .iter()
        .map(|lawyer| lawyer.id.0.as_str())
        .collect();
    assert_eq!(suggested, vec!["l-civil-top", "l-civil-high", "l-civil-mid"]);

    assert_eq!(view.steps.len(), 5);
    assert_eq!(view.relevant_articles.len(), 3);
    assert!(view.id.0.starts_with("case-"));
    assert_eq!(analyses.len(), 1);
}

#[tokio::test]
async fn blank_description_is_rejected_before_the_model_is_called() {
    let (service, assessor, _, analyses) =
        build_service(CountingAssessmentClient::returning(raw(50, 50, 50)));

    let submission = CaseSubmission {
        problem_description: Some("   ".to_string()),
        area_of_law: Some("Civil".to_string()),
    };
    match service.submit(&user(), submission).await {
        Err(CaseAnalysisError::Validation(ValidationError::MissingFields)) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(assessor.calls(), 0);
    assert_eq!(analyses.len(), 0);
}

#[tokio::test]
async fn unknown_area_is_rejected_before_the_model_is_called() {
    let (service, assessor, _, _) =
        build_service(CountingAssessmentClient::returning(raw(50, 50, 50)));

    let submission = CaseSubmission {
        problem_description: Some("Ship collision in the harbour".to_string()),
        area_of_law: Some("Maritime".to_string()),
    };
    let result = service.submit(&user(), submission).await;
    assert!(matches!(
        result,
        Err(CaseAnalysisError::Validation(ValidationError::UnknownArea(_)))
    ));
    assert_eq!(assessor.calls(), 0);
}

#[tokio::test]
async fn generation_failure_persists_nothing() {
    let (service, assessor, _, analyses) = build_service(CountingAssessmentClient::failing());

    let err = service
        .submit(&user(), civil_case())
        .await
        .expect_err("generation fails");

    assert!(matches!(err, CaseAnalysisError::Generation(_)));
    assert_eq!(err.to_string(), "assessment generation failed");
    assert_eq!(assessor.calls(), 1);
    assert_eq!(analyses.len(), 0);
}

#[tokio::test]
async fn slow_assessment_times_out_as_generation_failure() {
    let (service, _, _, analyses) =
        build_service(CountingAssessmentClient::stalling(Duration::from_secs(5)));
    let service = service.with_timeout(Duration::from_millis(20));

    match service.submit(&user(), civil_case()).await {
        Err(CaseAnalysisError::Generation(AssessmentError::Timeout(limit))) => {
            assert_eq!(limit, Duration::from_millis(20));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(analyses.len(), 0);
}

#[tokio::test]
async fn directory_failure_persists_nothing() {
    let analyses = Arc::new(MemoryAnalyses::default());
    let service = CaseAnalysisService::new(
        Arc::new(CountingAssessmentClient::returning(raw(50, 50, 50))),
        Arc::new(UnavailableDirectory),
        analyses.clone(),
    );

    let result = service.submit(&user(), civil_case()).await;
    assert!(matches!(result, Err(CaseAnalysisError::Directory(_))));
    assert_eq!(analyses.len(), 0);
}

#[tokio::test]
async fn careless_directory_results_are_filtered_sorted_and_capped() {
    let mut profiles = civil_directory();
    profiles.push(lawyer("l-civil-extra", AreaOfLaw::Civil, 4.95));
    let service = CaseAnalysisService::new(
        Arc::new(CountingAssessmentClient::returning(raw(50, 50, 50))),
        Arc::new(CarelessDirectory::new(profiles)),
        Arc::new(MemoryAnalyses::default()),
    );

    let view = service
        .submit(&user(), civil_case())
        .await
        .expect("analysis succeeds");

    let suggested: Vec<&str> = view
        .suggested_lawyers
        .iter()
        .map(|lawyer| lawyer.id.0.as_str())
        .collect();
    assert_eq!(suggested, vec!["l-civil-extra", "l-civil-top", "l-civil-high"]);
    assert!(view
        .suggested_lawyers
        .windows(2)
        .all(|pair| pair[0].rating >= pair[1].rating));
}

#[tokio::test]
async fn empty_directory_yields_no_suggestions() {
    let analyses = Arc::new(MemoryAnalyses::default());
    let service = CaseAnalysisService::new(
        Arc::new(CountingAssessmentClient::returning(raw(50, 50, 50))),
        Arc::new(MemoryDirectory::default()),
        analyses.clone(),
    );

    let view = service
        .submit(&user(), civil_case())
        .await
        .expect("analysis succeeds");
    assert!(view.suggested_lawyers.is_empty());
    assert_eq!(analyses.len(), 1);
}

#[tokio::test]
async fn repository_failure_surfaces_as_store_error() {
    let service = CaseAnalysisService::new(
        Arc::new(CountingAssessmentClient::returning(raw(50, 50, 50))),
        Arc::new(MemoryDirectory::with_profiles(civil_directory())),
        Arc::new(UnavailableAnalyses),
    );

    let result = service.submit(&user(), civil_case()).await;
    assert!(matches!(result, Err(CaseAnalysisError::Repository(_))));
}

#[tokio::test]
async fn get_returns_stored_analysis_or_not_found() {
    let (service, _, _, _) = build_service(CountingAssessmentClient::returning(raw(30, 80, 20)));
    let created = service
        .submit(&user(), civil_case())
        .await
        .expect("analysis succeeds");

    let fetched = service.get(&created.id).expect("analysis present");
    assert_eq!(fetched, created);

    assert!(matches!(
        service.get(&CaseAnalysisId("case-missing".to_string())),
        Err(CaseAnalysisError::NotFound)
    ));
}

#[tokio::test]
async fn removed_lawyers_are_dropped_from_later_views() {
    let (service, _, directory, _) =
        build_service(CountingAssessmentClient::returning(raw(30, 80, 20)));
    let created = service
        .submit(&user(), civil_case())
        .await
        .expect("analysis succeeds");
    assert_eq!(created.suggested_lawyers.len(), 3);

    directory
        .remove(&created.suggested_lawyers[0].id)
        .expect("lawyer removed");

    let fetched = service.get(&created.id).expect("analysis present");
    assert_eq!(fetched.suggested_lawyers.len(), 2);
}

#[tokio::test]
async fn list_for_user_returns_only_own_analyses_newest_first() {
    let (service, _, _, analyses) =
        build_service(CountingAssessmentClient::returning(raw(30, 80, 20)));
    let other = UserId("user-other".to_string());

    let first = service
        .submit(&user(), civil_case())
        .await
        .expect("first analysis");
    service
        .submit(&other, civil_case())
        .await
        .expect("other user's analysis");
    let second = service
        .submit(&user(), CaseSubmission::new("Unpaid consulting invoice", AreaOfLaw::Corporate))
        .await
        .expect("second analysis");

    let listed: Vec<CaseAnalysisId> = service
        .list_for_user(&user())
        .expect("list succeeds")
        .into_iter()
        .map(|view| view.id)
        .collect();
    assert_eq!(listed, vec![second.id, first.id]);
    assert_eq!(analyses.for_owner(&other).expect("lookup").len(), 1);
}
